pub mod issue_loan_cmd;
pub mod return_loans_cmd;
