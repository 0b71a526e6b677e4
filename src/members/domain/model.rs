use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// MemberEntity is a registered borrower; category is free text such as "Student" or "Staff"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub(crate) struct MemberEntity {
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

impl MemberEntity {
    pub fn new(name: &str, contact: &str, category: &str) -> Self {
        Self {
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

impl Identifiable for MemberEntity {
    fn id(&self) -> String {
        self.member_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use crate::members::domain::model::MemberEntity;

    #[tokio::test]
    async fn test_should_build_member() {
        let member = MemberEntity::new("Ana", "ana@example.com", "Student");
        assert_eq!("ana@example.com", member.contact.as_str());
        assert_eq!("Student", member.category.as_str());
        assert_eq!(36, member.member_id.len());
    }
}
