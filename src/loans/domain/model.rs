use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::LoanStatus;
use crate::utils::date::serializer;

// LoanEntity records one copy of a book lent to a member; book_title and
// member_name are joined in when reading and never written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub(crate) struct LoanEntity {
    pub loan_id: String,
    pub version: i64,
    pub member_id: String,
    pub member_name: String,
    pub book_id: String,
    pub book_title: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub loan_status: LoanStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl LoanEntity {
    pub fn new(member_id: &str, book_id: &str, issue_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            loan_id: Uuid::new_v4().to_string(),
            version: 0,
            member_id: member_id.to_string(),
            member_name: String::from(""),
            book_id: book_id.to_string(),
            book_title: String::from(""),
            issue_date,
            due_date,
            return_date: None,
            loan_status: LoanStatus::Active,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for LoanEntity {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::core::library::LoanStatus;
    use crate::loans::domain::model::LoanEntity;

    #[tokio::test]
    async fn test_should_build_loan() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).expect("should build date");
        let due = NaiveDate::from_ymd_opt(2024, 3, 8).expect("should build date");
        let loan = LoanEntity::new("member1", "book1", day, due);
        assert_eq!(LoanStatus::Active, loan.loan_status);
        assert_eq!(None, loan.return_date);
        assert_eq!(due, loan.due_date);
    }
}
