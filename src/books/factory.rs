use sqlx::SqlitePool;
use crate::books::repository::BookRepository;
use crate::books::repository::sqlite_book_repository::SqliteBookRepository;

pub(crate) fn create_book_repository(pool: &SqlitePool) -> Box<dyn BookRepository> {
    Box::new(SqliteBookRepository::new(pool.clone()))
}
