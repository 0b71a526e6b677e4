pub mod sqlite_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait BookRepository: Repository<BookEntity> {
    // every book ordered by title
    async fn list_by_title(&self) -> LibraryResult<Vec<BookEntity>>;

    // overwrites available_copies when the stored version still matches
    async fn update_stock(&self, book_id: &str, available_copies: i64, version: i64) -> LibraryResult<BookEntity>;

    // distinct years and publishers, for listing filters
    async fn facets(&self) -> LibraryResult<(Vec<i64>, Vec<String>)>;

    // (book_id, title) pairs ordered by title, for select boxes
    async fn choices(&self) -> LibraryResult<Vec<(String, String)>>;
}
