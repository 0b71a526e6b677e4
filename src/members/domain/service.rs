use std::collections::HashMap;
use async_trait::async_trait;
use tracing::info;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::validation::{validate_email, validate_text, MAX_CATEGORY, MAX_MEMBER_NAME};
use crate::gateway::events::{publish_after_commit, EventPublisher};
use crate::members::domain::MemberService;
use crate::members::domain::model::MemberEntity;
use crate::members::dto::MemberDto;
use crate::members::repository::MemberRepository;

pub(crate) struct MemberServiceImpl {
    branch_id: String,
    member_repository: Box<dyn MemberRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl MemberServiceImpl {
    pub(crate) fn new(config: &Configuration, member_repository: Box<dyn MemberRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            member_repository,
            events_publisher,
        }
    }
}

#[async_trait]
impl MemberService for MemberServiceImpl {
    async fn add_member(&self, member: &MemberDto) -> LibraryResult<MemberDto> {
        validate_text("name", member.name.as_str(), MAX_MEMBER_NAME)?;
        validate_email("contact", member.contact.as_str())?;
        validate_text("category", member.category.as_str(), MAX_CATEGORY)?;
        self.member_repository.create(&MemberEntity::from(member)).await?;
        info!(member_id = %member.member_id, category = %member.category, "added member");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::added(
            "member_added", "members",
            &HashMap::from([("branch_id".to_string(), self.branch_id.to_string())]), member)).await;
        Ok(member.clone())
    }

    async fn find_member_by_id(&self, id: &str) -> LibraryResult<MemberDto> {
        self.member_repository.get(id).await.map(|m| MemberDto::from(&m))
    }

    async fn query_members(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<MemberDto>> {
        let res = self.member_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(MemberDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }

    async fn member_choices(&self) -> LibraryResult<Vec<(String, String)>> {
        self.member_repository.choices().await
    }

    async fn categories(&self) -> LibraryResult<Vec<String>> {
        self.member_repository.categories().await
    }
}
