use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct IssueLoanCommand {
    loan_service: Box<dyn LoanService>,
}

impl IssueLoanCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueLoanCommandRequest {
    pub(crate) member_id: String,
    pub(crate) book_id: String,
}

impl IssueLoanCommandRequest {
    pub fn new(member_id: &str, book_id: &str) -> Self {
        Self {
            member_id: member_id.to_string(),
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IssueLoanCommandResponse {
    pub loan: LoanDto,
}

impl IssueLoanCommandResponse {
    pub fn new(loan: LoanDto) -> Self {
        Self {
            loan,
        }
    }
}

#[async_trait]
impl Command<IssueLoanCommandRequest, IssueLoanCommandResponse> for IssueLoanCommand {
    async fn execute(&self, req: IssueLoanCommandRequest) -> Result<IssueLoanCommandResponse, CommandError> {
        self.loan_service.issue_loan(req.member_id.as_str(), req.book_id.as_str())
            .await.map_err(CommandError::from).map(IssueLoanCommandResponse::new)
    }
}
