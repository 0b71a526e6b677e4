use sqlx::SqlitePool;
use crate::authors::repository::AuthorRepository;
use crate::authors::repository::sqlite_author_repository::SqliteAuthorRepository;

pub(crate) fn create_author_repository(pool: &SqlitePool) -> Box<dyn AuthorRepository> {
    Box::new(SqliteAuthorRepository::new(pool.clone()))
}
