use async_trait::async_trait;
use axum::extract::State;
use axum::response::Html;
use serde::Deserialize;
use crate::catalog::command::add_author_cmd::{AddAuthorCommand, AddAuthorCommandRequest};
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
use crate::catalog::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest};
use crate::catalog::domain::CatalogService;
use crate::catalog::factory;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{AppState, ServerError};
use crate::core::forms::{FormError, FormErrors, RecordForm};
use crate::core::library::LibraryResult;
use crate::core::validation::{validate_choice, validate_copies, validate_integer, validate_optional_text,
                              validate_text, INVALID_CHOICE, MAX_AUTHOR_NAME, MAX_NATIONALITY, MAX_PUBLISHER,
                              MAX_TITLE};
use crate::core::view::{escape, input, page, select, table};

fn build_service(state: &AppState) -> Box<dyn CatalogService> {
    factory::create_catalog_service(&state.config, &state.pool)
}

pub(crate) async fn list_books(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let res = ListBooksCommand::new(build_service(&state)).execute(ListBooksCommandRequest::default()).await?;
    let rows: Vec<Vec<String>> = res.books.iter().map(|b| vec![
        escape(&b.title),
        escape(&b.author_name),
        escape(&b.publisher),
        b.year.to_string(),
        b.available_copies.to_string(),
        b.total_copies.to_string(),
    ]).collect();
    let body = table(&["Title", "Author", "Publisher", "Year", "Available", "Total"], &rows);
    Ok(page("Book collection", &[], body.as_str()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AuthorForm {
    pub name: String,
    pub nationality: String,
}

#[async_trait]
impl RecordForm for AuthorForm {
    const ITEM_NAME: &'static str = "Author";
    const PATH: &'static str = "/authors/new";

    async fn render_fields(&self, _state: &AppState, errors: &FormErrors) -> LibraryResult<String> {
        Ok([
            input("text", "name", "Name", &self.name, errors.field("name")),
            input("text", "nationality", "Nationality", &self.nationality, errors.field("nationality")),
        ].concat())
    }

    async fn save(&self, state: &AppState) -> Result<String, FormError> {
        let mut errors = FormErrors::new();
        let name = errors.check(validate_text("name", &self.name, MAX_AUTHOR_NAME));
        let nationality = errors.check(validate_optional_text("nationality", &self.nationality, MAX_NATIONALITY));
        let (name, nationality) = match (name, nationality) {
            (Some(name), Some(nationality)) => (name, nationality),
            _ => return Err(FormError::Invalid(errors)),
        };
        let req = AddAuthorCommandRequest::new(name.as_str(), nationality.as_deref());
        let res = AddAuthorCommand::new(build_service(state)).execute(req).await?;
        Ok(res.author.author_id)
    }

    async fn describe(state: &AppState, id: &str) -> LibraryResult<String> {
        let author = build_service(state).find_author_by_id(id).await?;
        Ok(format!("{} \"{}\" registered successfully!", Self::ITEM_NAME, author))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct BookForm {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: String,
    pub total_copies: String,
    pub available_copies: String,
}

#[async_trait]
impl RecordForm for BookForm {
    const ITEM_NAME: &'static str = "Book";
    const PATH: &'static str = "/books/new";

    async fn render_fields(&self, state: &AppState, errors: &FormErrors) -> LibraryResult<String> {
        let authors = build_service(state).author_choices().await?;
        Ok([
            input("text", "title", "Title", &self.title, errors.field("title")),
            select("author", "Author", &authors, &self.author, errors.field("author")),
            input("text", "publisher", "Publisher", &self.publisher, errors.field("publisher")),
            input("number", "year", "Year", &self.year, errors.field("year")),
            input("number", "total_copies", "Total copies (initial stock)", &self.total_copies, errors.field("total_copies")),
            input("number", "available_copies", "Available copies (initial stock)", &self.available_copies,
                  errors.field("available_copies")),
        ].concat())
    }

    async fn save(&self, state: &AppState) -> Result<String, FormError> {
        let mut errors = FormErrors::new();
        let title = errors.check(validate_text("title", &self.title, MAX_TITLE));
        let author = errors.check(validate_choice("author", &self.author));
        let publisher = errors.check(validate_text("publisher", &self.publisher, MAX_PUBLISHER));
        let year = errors.check(validate_integer("year", &self.year));
        let total = errors.check(validate_integer("total_copies", &self.total_copies));
        let available = errors.check(validate_integer("available_copies", &self.available_copies));
        if let (Some(total), Some(available)) = (total, available) {
            errors.check(validate_copies(total, available));
        }
        let req = match (title, author, publisher, year, total, available) {
            (Some(title), Some(author), Some(publisher), Some(year), Some(total), Some(available)) if errors.is_empty() => {
                AddBookCommandRequest::new(title.as_str(), author.as_str(), publisher.as_str(), year, total, available)
            }
            _ => return Err(FormError::Invalid(errors)),
        };
        match AddBookCommand::new(build_service(state)).execute(req).await {
            Ok(res) => Ok(res.book.book_id),
            Err(CommandError::NotFound { .. }) => {
                errors.add("author", INVALID_CHOICE);
                Err(FormError::Invalid(errors))
            }
            Err(err) => Err(FormError::Command(err)),
        }
    }

    async fn describe(state: &AppState, id: &str) -> LibraryResult<String> {
        let book = build_service(state).find_book_by_id(id).await?;
        Ok(format!("{} \"{}\" registered successfully!", Self::ITEM_NAME, book))
    }
}
