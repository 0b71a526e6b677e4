use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::members::domain::model::MemberEntity;
use crate::utils::date::serializer;

// MemberDto is a data transfer object for Member service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDto {
    pub member_id: String,
    pub version: i64,
    pub name: String,
    pub contact: String,
    pub category: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl MemberDto {
    pub fn new(name: &str, contact: &str, category: &str) -> MemberDto {
        MemberDto {
            member_id: Uuid::new_v4().to_string(),
            version: 0,
            name: name.to_string(),
            contact: contact.to_string(),
            category: category.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for MemberDto {
    fn id(&self) -> String {
        self.member_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Display for MemberDto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&MemberEntity> for MemberDto {
    fn from(other: &MemberEntity) -> Self {
        Self {
            member_id: other.member_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            contact: other.contact.to_string(),
            category: other.category.to_string(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&MemberDto> for MemberEntity {
    fn from(other: &MemberDto) -> Self {
        Self {
            member_id: other.member_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            contact: other.contact.to_string(),
            category: other.category.to_string(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
