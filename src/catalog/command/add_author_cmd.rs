use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::authors::dto::AuthorDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddAuthorCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddAuthorCommand {
    pub(crate) fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddAuthorCommandRequest {
    pub(crate) name: String,
    pub(crate) nationality: Option<String>,
}

impl AddAuthorCommandRequest {
    pub fn new(name: &str, nationality: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            nationality: nationality.map(str::to_string),
        }
    }

    pub fn build_author(&self) -> AuthorDto {
        AuthorDto::new(self.name.as_str(), self.nationality.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddAuthorCommandResponse {
    pub author: AuthorDto,
}

impl AddAuthorCommandResponse {
    pub fn new(author: AuthorDto) -> Self {
        Self {
            author,
        }
    }
}

#[async_trait]
impl Command<AddAuthorCommandRequest, AddAuthorCommandResponse> for AddAuthorCommand {
    async fn execute(&self, req: AddAuthorCommandRequest) -> Result<AddAuthorCommandResponse, CommandError> {
        let author = req.build_author();
        self.catalog_service.add_author(&author).await.map_err(CommandError::from).map(AddAuthorCommandResponse::new)
    }
}
