use std::collections::HashMap;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use crate::authors::domain::model::AuthorEntity;
use crate::authors::repository::AuthorRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::db::{page_offset, push_page, push_predicate, to_paginated};

const FILTER_COLUMNS: &[(&str, &str)] = &[("name", "name"), ("nationality", "nationality")];
const SEARCH_COLUMNS: &[&str] = &["name"];

#[derive(Debug)]
pub struct SqliteAuthorRepository {
    pool: SqlitePool,
}

impl SqliteAuthorRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl Repository<AuthorEntity> for SqliteAuthorRepository {
    async fn create(&self, entity: &AuthorEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "INSERT INTO authors (author_id, version, name, nationality, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&entity.author_id)
            .bind(entity.version)
            .bind(&entity.name)
            .bind(&entity.nationality)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&self.pool)
            .await?;
        debug!(author_id = %entity.author_id, "inserted author");
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: &str) -> LibraryResult<AuthorEntity> {
        sqlx::query_as::<_, AuthorEntity>("SELECT * FROM authors WHERE author_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("author not found for {}", id).as_str()))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AuthorEntity>> {
        let offset = page_offset(page)?;
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM authors WHERE 1 = 1");
        push_predicate(&mut builder, predicate, FILTER_COLUMNS, SEARCH_COLUMNS)?;
        builder.push(" ORDER BY name, author_id");
        push_page(&mut builder, offset, page_size);
        let records = builder.build_query_as::<AuthorEntity>().fetch_all(&self.pool).await?;
        Ok(to_paginated(page, offset, page_size, records))
    }
}

#[async_trait]
impl AuthorRepository for SqliteAuthorRepository {
    async fn choices(&self) -> LibraryResult<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT author_id, name FROM authors ORDER BY name, author_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::authors::domain::model::AuthorEntity;
    use crate::authors::repository::AuthorRepository;
    use crate::authors::repository::sqlite_author_repository::SqliteAuthorRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::utils::db::create_test_pool;

    #[tokio::test]
    async fn test_should_create_get_authors() {
        let authors_repo = SqliteAuthorRepository::new(create_test_pool().await);
        let author = AuthorEntity::new("Machado de Assis", Some("Brazilian"));
        let size = authors_repo.create(&author).await.expect("should create author");
        assert_eq!(1, size);

        let loaded = authors_repo.get(author.author_id.as_str()).await.expect("should return author");
        assert_eq!(author.name, loaded.name);
        assert_eq!(author.nationality, loaded.nationality);
        assert_eq!(author.created_at, loaded.created_at);
    }

    #[tokio::test]
    async fn test_should_not_get_missing_author() {
        let authors_repo = SqliteAuthorRepository::new(create_test_pool().await);
        let res = authors_repo.get("missing").await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_author_id() {
        let authors_repo = SqliteAuthorRepository::new(create_test_pool().await);
        let author = AuthorEntity::new("Machado de Assis", None);
        authors_repo.create(&author).await.expect("should create author");
        let res = authors_repo.create(&author).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_should_search_authors_by_name() {
        let authors_repo = SqliteAuthorRepository::new(create_test_pool().await);
        for name in ["Machado de Assis", "Clarice Lispector", "Cecília Meireles"] {
            authors_repo.create(&AuthorEntity::new(name, None)).await.expect("should create author");
        }
        let res = authors_repo.query(&HashMap::from([("q".to_string(), "lis".to_string())]), None, 10)
            .await.expect("should query authors");
        assert_eq!(1, res.records.len());
        assert_eq!("Clarice Lispector", res.records[0].name.as_str());

        let res = authors_repo.query(&HashMap::new(), None, 2).await.expect("should query authors");
        assert_eq!(2, res.records.len());
        assert_eq!(Some("2".to_string()), res.next_page);
        let res = authors_repo.query(&HashMap::new(), res.next_page.as_deref(), 2).await.expect("should query authors");
        assert_eq!(1, res.records.len());
        assert_eq!(None, res.next_page);
    }

    #[tokio::test]
    async fn test_should_list_author_choices() {
        let authors_repo = SqliteAuthorRepository::new(create_test_pool().await);
        authors_repo.create(&AuthorEntity::new("Rachel de Queiroz", None)).await.expect("should create author");
        authors_repo.create(&AuthorEntity::new("Graciliano Ramos", None)).await.expect("should create author");
        let choices = authors_repo.choices().await.expect("should list choices");
        let names: Vec<&str> = choices.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(vec!["Graciliano Ramos", "Rachel de Queiroz"], names);
    }
}
