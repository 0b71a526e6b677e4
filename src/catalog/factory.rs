use sqlx::SqlitePool;
use crate::authors::factory::create_author_repository;
use crate::books::factory::create_book_repository;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;

pub(crate) fn create_catalog_service(config: &Configuration, pool: &SqlitePool) -> Box<dyn CatalogService> {
    let author_repo = create_author_repository(pool);
    let book_repo = create_book_repository(pool);
    let publisher = create_publisher(config);
    Box::new(CatalogServiceImpl::new(config, author_repo, book_repo, publisher))
}
