pub mod model;
pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::loans::dto::LoanDto;

// due date of a loan issued `today`; saturates instead of overflowing the calendar
pub fn default_due_date(today: NaiveDate, loan_days: i64) -> NaiveDate {
    today.checked_add_days(Days::new(loan_days.max(0) as u64)).unwrap_or(NaiveDate::MAX)
}

// BulkReturnReport tells how far a bulk return got; it stops at the first failure
// and loans returned before it stay returned
#[derive(Debug, Default, Clone, Serialize)]
pub struct BulkReturnReport {
    pub returned: Vec<LoanDto>,
    pub skipped: usize,
    pub failure: Option<String>,
}

#[async_trait]
pub(crate) trait LoanService: Sync + Send {
    async fn issue_loan(&self, member_id: &str, book_id: &str) -> LibraryResult<LoanDto>;
    // None when the loan had already been returned
    async fn return_loan(&self, loan_id: &str) -> LibraryResult<Option<LoanDto>>;
    async fn return_loans(&self, loan_ids: &[String]) -> BulkReturnReport;
    async fn find_loan_by_id(&self, id: &str) -> LibraryResult<LoanDto>;
    async fn query_loans(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>>;
    async fn query_overdue(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::core::domain::DEFAULT_LOAN_DAYS;
    use crate::loans::domain::default_due_date;

    #[tokio::test]
    async fn test_should_compute_due_date() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 26).expect("should build date");
        assert_eq!(NaiveDate::from_ymd_opt(2024, 3, 4).expect("should build date"), default_due_date(day, DEFAULT_LOAN_DAYS));
        assert_eq!(day, default_due_date(day, 0));
        assert_eq!(NaiveDate::MAX, default_due_date(day, i64::MAX));
    }
}
