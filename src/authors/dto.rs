use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::authors::domain::model::AuthorEntity;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// AuthorDto is a data transfer object for the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub author_id: String,
    pub version: i64,
    pub name: String,
    pub nationality: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl AuthorDto {
    pub fn new(name: &str, nationality: Option<&str>) -> AuthorDto {
        AuthorDto {
            author_id: Uuid::new_v4().to_string(),
            version: 0,
            name: name.to_string(),
            nationality: nationality.map(str::to_string),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for AuthorDto {
    fn id(&self) -> String {
        self.author_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Display for AuthorDto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&AuthorEntity> for AuthorDto {
    fn from(other: &AuthorEntity) -> Self {
        Self {
            author_id: other.author_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            nationality: other.nationality.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&AuthorDto> for AuthorEntity {
    fn from(other: &AuthorDto) -> Self {
        Self {
            author_id: other.author_id.to_string(),
            version: other.version,
            name: other.name.to_string(),
            nationality: other.nationality.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::authors::dto::AuthorDto;

    #[tokio::test]
    async fn test_should_display_author_name() {
        let author = AuthorDto::new("Jorge Amado", None);
        assert_eq!("Jorge Amado", author.to_string().as_str());
        assert_eq!(None, author.nationality);
    }
}
