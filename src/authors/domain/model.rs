use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// AuthorEntity is a writer of one or more books in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub(crate) struct AuthorEntity {
    pub author_id: String,
    pub version: i64,
    pub name: String,
    pub nationality: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl AuthorEntity {
    pub fn new(name: &str, nationality: Option<&str>) -> Self {
        Self {
            author_id: Uuid::new_v4().to_string(),
            version: 0,
            name: name.to_string(),
            nationality: nationality.map(str::to_string),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for AuthorEntity {
    fn id(&self) -> String {
        self.author_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
