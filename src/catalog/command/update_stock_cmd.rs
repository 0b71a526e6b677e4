use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::validation::validate_copies;

pub(crate) struct UpdateStockCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl UpdateStockCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStockCommandRequest {
    pub(crate) book_id: String,
    pub(crate) available_copies: i64,
    pub(crate) version: i64,
}

impl UpdateStockCommandRequest {
    pub fn new(book_id: &str, available_copies: i64, version: i64) -> Self {
        Self {
            book_id: book_id.to_string(),
            available_copies,
            version,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateStockCommandResponse {
    pub book: BookDto,
}

impl UpdateStockCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateStockCommandRequest, UpdateStockCommandResponse> for UpdateStockCommand {
    async fn execute(&self, req: UpdateStockCommandRequest) -> Result<UpdateStockCommandResponse, CommandError> {
        let book = self.catalog_service.find_book_by_id(req.book_id.as_str()).await.map_err(CommandError::from)?;
        validate_copies(book.total_copies, req.available_copies)
            .map_err(|err| CommandError::Validation { message: err.to_string(), reason_code: Some(err.field().to_string()) })?;
        self.catalog_service.update_stock(req.book_id.as_str(), req.available_copies, req.version)
            .await.map_err(CommandError::from).map(UpdateStockCommandResponse::new)
    }
}
