pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::authors::dto::AuthorDto;
use crate::books::dto::BookDto;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub(crate) trait CatalogService: Sync + Send {
    async fn add_author(&self, author: &AuthorDto) -> LibraryResult<AuthorDto>;
    async fn find_author_by_id(&self, id: &str) -> LibraryResult<AuthorDto>;
    async fn query_authors(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AuthorDto>>;
    async fn author_choices(&self) -> LibraryResult<Vec<(String, String)>>;
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto>;
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn query_books(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>>;
    async fn book_choices(&self) -> LibraryResult<Vec<(String, String)>>;
    async fn book_facets(&self) -> LibraryResult<(Vec<i64>, Vec<String>)>;
    async fn update_stock(&self, book_id: &str, available_copies: i64, version: i64) -> LibraryResult<BookDto>;
}
