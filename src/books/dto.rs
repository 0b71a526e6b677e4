use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::authors::dto::AuthorDto;
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub book_id: String,
    pub version: i64,
    pub title: String,
    pub author_id: String,
    pub author_name: String,
    pub publisher: String,
    pub year: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookDto {
    pub fn new(title: &str, author: &AuthorDto, publisher: &str, year: i64,
               total_copies: i64, available_copies: i64) -> BookDto {
        BookDto {
            book_id: Uuid::new_v4().to_string(),
            version: 0,
            title: title.to_string(),
            author_id: author.author_id.to_string(),
            author_name: author.name.to_string(),
            publisher: publisher.to_string(),
            year,
            total_copies,
            available_copies,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Display for BookDto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author_id: other.author_id.to_string(),
            author_name: other.author_name.to_string(),
            publisher: other.publisher.to_string(),
            year: other.year,
            total_copies: other.total_copies,
            available_copies: other.available_copies,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author_id: other.author_id.to_string(),
            author_name: other.author_name.to_string(),
            publisher: other.publisher.to_string(),
            year: other.year,
            total_copies: other.total_copies,
            available_copies: other.available_copies,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::authors::dto::AuthorDto;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let author = AuthorDto::new("Machado de Assis", None);
        let book = BookDto::new("Dom Casmurro", &author, "Garnier", 1899, 2, 0);
        assert_eq!("Dom Casmurro", book.to_string().as_str());
        assert_eq!(author.author_id, book.author_id);
        assert_eq!("Machado de Assis", book.author_name.as_str());
        assert!(!book.is_available());
    }
}
