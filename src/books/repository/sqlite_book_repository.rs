use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::db::{page_offset, push_page, push_predicate, to_paginated};

const SELECT_BOOKS: &str = "SELECT b.book_id, b.version, b.title, b.author_id, a.name AS author_name, \
    b.publisher, b.year, b.total_copies, b.available_copies, b.created_at, b.updated_at \
    FROM books b JOIN authors a ON a.author_id = b.author_id";

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("title", "b.title"),
    ("author_id", "b.author_id"),
    ("publisher", "b.publisher"),
    ("year", "b.year"),
];
const SEARCH_COLUMNS: &[&str] = &["b.title", "a.name"];

#[derive(Debug)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for SqliteBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "INSERT INTO books (book_id, version, title, author_id, publisher, year, total_copies, \
             available_copies, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(&entity.book_id)
            .bind(entity.version)
            .bind(&entity.title)
            .bind(&entity.author_id)
            .bind(&entity.publisher)
            .bind(entity.year)
            .bind(entity.total_copies)
            .bind(entity.available_copies)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&self.pool)
            .await?;
        debug!(book_id = %entity.book_id, "inserted book");
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        sqlx::query_as::<_, BookEntity>(format!("{} WHERE b.book_id = ?", SELECT_BOOKS).as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", id).as_str()))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let offset = page_offset(page)?;
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_BOOKS);
        builder.push(" WHERE 1 = 1");
        push_predicate(&mut builder, predicate, FILTER_COLUMNS, SEARCH_COLUMNS)?;
        builder.push(" ORDER BY b.title, b.book_id");
        push_page(&mut builder, offset, page_size);
        let records = builder.build_query_as::<BookEntity>().fetch_all(&self.pool).await?;
        Ok(to_paginated(page, offset, page_size, records))
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list_by_title(&self) -> LibraryResult<Vec<BookEntity>> {
        let books = sqlx::query_as::<_, BookEntity>(format!("{} ORDER BY b.title, b.book_id", SELECT_BOOKS).as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn update_stock(&self, book_id: &str, available_copies: i64, version: i64) -> LibraryResult<BookEntity> {
        let res = sqlx::query(
            "UPDATE books SET available_copies = ?, version = version + 1, updated_at = ? \
             WHERE book_id = ? AND version = ? AND ? BETWEEN 0 AND total_copies")
            .bind(available_copies)
            .bind(Utc::now().naive_utc())
            .bind(book_id)
            .bind(version)
            .bind(available_copies)
            .execute(&self.pool)
            .await?;
        let current = self.get(book_id).await?;
        if res.rows_affected() == 0 {
            return if current.version != version {
                Err(LibraryError::validation(
                    format!("book {} was changed by someone else, reload and try again", current.title).as_str(),
                    Some("version".to_string())))
            } else {
                Err(LibraryError::validation(
                    format!("available copies of {} must be between 0 and {}", current.title, current.total_copies).as_str(),
                    Some("available_copies".to_string())))
            };
        }
        debug!(book_id, available_copies, "updated book stock");
        Ok(current)
    }

    async fn facets(&self) -> LibraryResult<(Vec<i64>, Vec<String>)> {
        let years = sqlx::query_scalar::<_, i64>("SELECT DISTINCT year FROM books ORDER BY year DESC")
            .fetch_all(&self.pool)
            .await?;
        let publishers = sqlx::query_scalar::<_, String>("SELECT DISTINCT publisher FROM books ORDER BY publisher")
            .fetch_all(&self.pool)
            .await?;
        Ok((years, publishers))
    }

    async fn choices(&self) -> LibraryResult<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT book_id, title FROM books ORDER BY title, book_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
