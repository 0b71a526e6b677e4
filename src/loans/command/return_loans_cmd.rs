use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::{BulkReturnReport, LoanService};

pub(crate) struct ReturnLoansCommand {
    loan_service: Box<dyn LoanService>,
}

impl ReturnLoansCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnLoansCommandRequest {
    pub(crate) loan_ids: Vec<String>,
}

impl ReturnLoansCommandRequest {
    pub fn new(loan_ids: Vec<String>) -> Self {
        Self {
            loan_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReturnLoansCommandResponse {
    pub report: BulkReturnReport,
}

impl ReturnLoansCommandResponse {
    pub fn new(report: BulkReturnReport) -> Self {
        Self {
            report,
        }
    }
}

#[async_trait]
impl Command<ReturnLoansCommandRequest, ReturnLoansCommandResponse> for ReturnLoansCommand {
    // partial progress is reported, not raised, so it never fails as a whole
    async fn execute(&self, req: ReturnLoansCommandRequest) -> Result<ReturnLoansCommandResponse, CommandError> {
        let report = self.loan_service.return_loans(&req.loan_ids).await;
        Ok(ReturnLoansCommandResponse::new(report))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::loans::command::return_loans_cmd::{ReturnLoansCommand, ReturnLoansCommandRequest};
    use crate::loans::factory::create_loan_service;
    use crate::utils::date::SystemClock;
    use crate::utils::db::create_test_pool;

    #[tokio::test]
    async fn test_should_run_return_loans() {
        let pool = create_test_pool().await;
        let cmd = ReturnLoansCommand::new(create_loan_service(&Configuration::new("test"), &pool, Arc::new(SystemClock)));
        let res = cmd.execute(ReturnLoansCommandRequest::new(vec![])).await.expect("should return loans");
        assert!(res.report.returned.is_empty());
        assert!(res.report.failure.is_none());

        let res = cmd.execute(ReturnLoansCommandRequest::new(vec!["missing".to_string()])).await.expect("should return loans");
        assert!(res.report.failure.is_some());
    }
}
