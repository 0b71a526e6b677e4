pub mod sqlite_author_repository;

use async_trait::async_trait;
use crate::authors::domain::model::AuthorEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait AuthorRepository: Repository<AuthorEntity> {
    // (author_id, name) pairs ordered by name, for select boxes and filters
    async fn choices(&self) -> LibraryResult<Vec<(String, String)>>;
}
