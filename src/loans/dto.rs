use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::books::dto::BookDto;
use crate::core::domain::Identifiable;
use crate::core::library::LoanStatus;
use crate::loans::domain::model::LoanEntity;
use crate::members::dto::MemberDto;
use crate::utils::date::serializer;

// LoanDto is a data transfer object for Loan service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDto {
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

impl LoanDto {
    pub fn new(member: &MemberDto, book: &BookDto, issue_date: NaiveDate, due_date: NaiveDate) -> LoanDto {
        LoanDto {
            loan_id: Uuid::new_v4().to_string(),
            version: 0,
            member_id: member.member_id.to_string(),
            member_name: member.name.to_string(),
            book_id: book.book_id.to_string(),
            book_title: book.title.to_string(),
            issue_date,
            due_date,
            return_date: None,
            loan_status: LoanStatus::Active,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.loan_status == LoanStatus::Active && self.due_date < today
    }
}

impl Identifiable for LoanDto {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Display for LoanDto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.book_title, self.member_name)
    }
}

impl From<&LoanEntity> for LoanDto {
    fn from(other: &LoanEntity) -> Self {
        Self {
            loan_id: other.loan_id.to_string(),
            version: other.version,
            member_id: other.member_id.to_string(),
            member_name: other.member_name.to_string(),
            book_id: other.book_id.to_string(),
            book_title: other.book_title.to_string(),
            issue_date: other.issue_date,
            due_date: other.due_date,
            return_date: other.return_date,
            loan_status: other.loan_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&LoanDto> for LoanEntity {
    fn from(other: &LoanDto) -> Self {
        Self {
            loan_id: other.loan_id.to_string(),
            version: other.version,
            member_id: other.member_id.to_string(),
            member_name: other.member_name.to_string(),
            book_id: other.book_id.to_string(),
            book_title: other.book_title.to_string(),
            issue_date: other.issue_date,
            due_date: other.due_date,
            return_date: other.return_date,
            loan_status: other.loan_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
