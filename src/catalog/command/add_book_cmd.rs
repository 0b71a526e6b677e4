use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddBookCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) title: String,
    pub(crate) author_id: String,
    pub(crate) publisher: String,
    pub(crate) year: i64,
    pub(crate) total_copies: i64,
    pub(crate) available_copies: i64,
}

impl AddBookCommandRequest {
    pub fn new(title: &str, author_id: &str, publisher: &str, year: i64,
               total_copies: i64, available_copies: i64) -> Self {
        Self {
            title: title.to_string(),
            author_id: author_id.to_string(),
            publisher: publisher.to_string(),
            year,
            total_copies,
            available_copies,
        }
    }

    pub async fn build_book(&self, catalog_service: &dyn CatalogService) -> Result<BookDto, CommandError> {
        let author = catalog_service.find_author_by_id(self.author_id.as_str()).await.map_err(CommandError::from)?;
        Ok(BookDto::new(self.title.as_str(), &author, self.publisher.as_str(), self.year,
                        self.total_copies, self.available_copies))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book(self.catalog_service.as_ref()).await?;
        self.catalog_service.add_book(&book).await.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::authors::dto::AuthorDto;
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::factory;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::utils::db::create_test_pool;

    #[tokio::test]
    async fn test_should_run_add_book() {
        let pool = create_test_pool().await;
        let config = Configuration::new("test");
        let author = factory::create_catalog_service(&config, &pool)
            .add_author(&AuthorDto::new("Graciliano Ramos", None)).await.expect("should add author");
        let cmd = AddBookCommand::new(factory::create_catalog_service(&config, &pool));

        let res = cmd.execute(AddBookCommandRequest::new("Vidas Secas", author.author_id.as_str(), "José Olympio", 1938, 2, 2))
            .await.expect("should add book");
        assert_eq!("Graciliano Ramos", res.book.author_name.as_str());

        let res = cmd.execute(AddBookCommandRequest::new("Vidas Secas", "missing", "José Olympio", 1938, 2, 2)).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
    }
}
