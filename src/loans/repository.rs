pub mod sqlite_loan_repository;

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;

#[async_trait]
pub(crate) trait LoanRepository: Repository<LoanEntity> {
    // takes one copy of the book off the shelf and records the loan, both or neither
    async fn issue(&self, loan: &LoanEntity) -> LibraryResult<LoanEntity>;

    // closes an active loan and puts the copy back; false when it was already returned
    async fn mark_returned(&self, loan_id: &str, return_date: NaiveDate) -> LibraryResult<bool>;
}
