use std::collections::HashMap;
use async_trait::async_trait;
use tracing::info;
use crate::authors::domain::model::AuthorEntity;
use crate::authors::dto::AuthorDto;
use crate::authors::repository::AuthorRepository;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::validation::{validate_copies, validate_optional_text, validate_text, MAX_AUTHOR_NAME,
                              MAX_NATIONALITY, MAX_PUBLISHER, MAX_TITLE};
use crate::gateway::events::{publish_after_commit, EventPublisher};

pub(crate) struct CatalogServiceImpl {
    branch_id: String,
    author_repository: Box<dyn AuthorRepository>,
    book_repository: Box<dyn BookRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(config: &Configuration, author_repository: Box<dyn AuthorRepository>,
                      book_repository: Box<dyn BookRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            author_repository,
            book_repository,
            events_publisher,
        }
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([("branch_id".to_string(), self.branch_id.to_string())])
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_author(&self, author: &AuthorDto) -> LibraryResult<AuthorDto> {
        validate_text("name", author.name.as_str(), MAX_AUTHOR_NAME)?;
        validate_optional_text("nationality", author.nationality.as_deref().unwrap_or_default(), MAX_NATIONALITY)?;
        self.author_repository.create(&AuthorEntity::from(author)).await?;
        info!(author_id = %author.author_id, name = %author.name, "added author");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::added(
            "author_added", "catalog", &self.metadata(), author)).await;
        Ok(author.clone())
    }

    async fn find_author_by_id(&self, id: &str) -> LibraryResult<AuthorDto> {
        self.author_repository.get(id).await.map(|a| AuthorDto::from(&a))
    }

    async fn query_authors(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AuthorDto>> {
        let res = self.author_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(AuthorDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }

    async fn author_choices(&self) -> LibraryResult<Vec<(String, String)>> {
        self.author_repository.choices().await
    }

    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        validate_text("title", book.title.as_str(), MAX_TITLE)?;
        validate_text("publisher", book.publisher.as_str(), MAX_PUBLISHER)?;
        validate_copies(book.total_copies, book.available_copies)?;
        let author = self.author_repository.get(book.author_id.as_str()).await.map_err(|err| match err {
            LibraryError::NotFound { .. } => LibraryError::validation(
                format!("author {} does not exist", book.author_id).as_str(), Some("author".to_string())),
            other => other,
        })?;
        let mut book = book.clone();
        book.author_name = author.name;
        self.book_repository.create(&BookEntity::from(&book)).await?;
        info!(book_id = %book.book_id, title = %book.title, copies = book.total_copies, "added book");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::added(
            "book_added", "catalog", &self.metadata(), &book)).await;
        Ok(book)
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn list_books(&self) -> LibraryResult<Vec<BookDto>> {
        let books = self.book_repository.list_by_title().await?;
        Ok(books.iter().map(BookDto::from).collect())
    }

    async fn query_books(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>> {
        let res = self.book_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(BookDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }

    async fn book_choices(&self) -> LibraryResult<Vec<(String, String)>> {
        self.book_repository.choices().await
    }

    async fn book_facets(&self) -> LibraryResult<(Vec<i64>, Vec<String>)> {
        self.book_repository.facets().await
    }

    async fn update_stock(&self, book_id: &str, available_copies: i64, version: i64) -> LibraryResult<BookDto> {
        let updated = self.book_repository.update_stock(book_id, available_copies, version).await?;
        let book = BookDto::from(&updated);
        info!(book_id, available_copies, "updated book stock");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::updated(
            "book_stock_updated", "catalog", &self.metadata(), &book)).await;
        Ok(book)
    }
}
