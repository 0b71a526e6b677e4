pub mod sqlite_member_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::members::domain::model::MemberEntity;

#[async_trait]
pub(crate) trait MemberRepository: Repository<MemberEntity> {
    // (member_id, name) pairs ordered by name, for select boxes
    async fn choices(&self) -> LibraryResult<Vec<(String, String)>>;

    // distinct categories in use
    async fn categories(&self) -> LibraryResult<Vec<String>>;
}
