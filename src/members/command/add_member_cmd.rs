use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::members::domain::MemberService;
use crate::members::dto::MemberDto;

pub(crate) struct AddMemberCommand {
    member_service: Box<dyn MemberService>,
}

impl AddMemberCommand {
    pub(crate) fn new(member_service: Box<dyn MemberService>) -> Self {
        Self {
            member_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddMemberCommandRequest {
    pub(crate) name: String,
    pub(crate) contact: String,
    pub(crate) category: String,
}

impl AddMemberCommandRequest {
    pub fn new(name: &str, contact: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            contact: contact.to_string(),
            category: category.to_string(),
        }
    }

    pub fn build_member(&self) -> MemberDto {
        MemberDto::new(self.name.as_str(), self.contact.as_str(), self.category.as_str())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddMemberCommandResponse {
    pub member: MemberDto,
}

impl AddMemberCommandResponse {
    pub fn new(member: MemberDto) -> Self {
        Self {
            member,
        }
    }
}

#[async_trait]
impl Command<AddMemberCommandRequest, AddMemberCommandResponse> for AddMemberCommand {
    async fn execute(&self, req: AddMemberCommandRequest) -> Result<AddMemberCommandResponse, CommandError> {
        let member = req.build_member();
        self.member_service.add_member(&member).await.map_err(CommandError::from).map(AddMemberCommandResponse::new)
    }
}
