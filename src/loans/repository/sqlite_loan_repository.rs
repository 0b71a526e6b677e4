use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, PaginatedResult};
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::utils::db::{page_offset, push_page, push_predicate, to_paginated};

pub(crate) const NO_COPIES_AVAILABLE: &str = "This book has no copies available in stock.";

const SELECT_LOANS: &str = "SELECT l.loan_id, l.version, l.member_id, m.name AS member_name, \
    l.book_id, b.title AS book_title, l.issue_date, l.due_date, l.return_date, l.loan_status, \
    l.created_at, l.updated_at \
    FROM loans l JOIN members m ON m.member_id = l.member_id JOIN books b ON b.book_id = l.book_id";

const FILTER_COLUMNS: &[(&str, &str)] = &[
    ("loan_status", "l.loan_status"),
    ("member_id", "l.member_id"),
    ("book_id", "l.book_id"),
    ("issue_date", "l.issue_date"),
    ("due_date", "l.due_date"),
];
const SEARCH_COLUMNS: &[&str] = &["b.title", "m.name"];

#[derive(Debug)]
pub struct SqliteLoanRepository {
    pool: SqlitePool,
}

impl SqliteLoanRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl Repository<LoanEntity> for SqliteLoanRepository {
    // inserts the row alone, stock is left untouched; use issue for lending
    async fn create(&self, entity: &LoanEntity) -> LibraryResult<usize> {
        let res = sqlx::query(
            "INSERT INTO loans (loan_id, version, member_id, book_id, issue_date, due_date, return_date, \
             loan_status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(&entity.loan_id)
            .bind(entity.version)
            .bind(&entity.member_id)
            .bind(&entity.book_id)
            .bind(entity.issue_date)
            .bind(entity.due_date)
            .bind(entity.return_date)
            .bind(entity.loan_status)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&self.pool)
            .await?;
        debug!(loan_id = %entity.loan_id, "inserted loan");
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: &str) -> LibraryResult<LoanEntity> {
        sqlx::query_as::<_, LoanEntity>(format!("{} WHERE l.loan_id = ?", SELECT_LOANS).as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("loan not found for {}", id).as_str()))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanEntity>> {
        let offset = page_offset(page)?;
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_LOANS);
        builder.push(" WHERE 1 = 1");
        push_predicate(&mut builder, predicate, FILTER_COLUMNS, SEARCH_COLUMNS)?;
        builder.push(" ORDER BY l.issue_date DESC, l.created_at DESC, l.loan_id");
        push_page(&mut builder, offset, page_size);
        let records = builder.build_query_as::<LoanEntity>().fetch_all(&self.pool).await?;
        Ok(to_paginated(page, offset, page_size, records))
    }
}

#[async_trait]
impl LoanRepository for SqliteLoanRepository {
    async fn issue(&self, loan: &LoanEntity) -> LibraryResult<LoanEntity> {
        // the first statement writes, so the transaction takes the write lock up front
        let mut tx = self.pool.begin().await?;
        let taken = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1, version = version + 1, updated_at = ? \
             WHERE book_id = ? AND available_copies > 0")
            .bind(Utc::now().naive_utc())
            .bind(&loan.book_id)
            .execute(&mut *tx)
            .await?;
        if taken.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE book_id = ?")
                .bind(&loan.book_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            return if exists == 0 {
                Err(LibraryError::not_found(format!("book not found for {}", loan.book_id).as_str()))
            } else {
                Err(LibraryError::validation(NO_COPIES_AVAILABLE, Some("book".to_string())))
            };
        }
        sqlx::query(
            "INSERT INTO loans (loan_id, version, member_id, book_id, issue_date, due_date, return_date, \
             loan_status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)")
            .bind(&loan.loan_id)
            .bind(loan.version)
            .bind(&loan.member_id)
            .bind(&loan.book_id)
            .bind(loan.issue_date)
            .bind(loan.due_date)
            .bind(LoanStatus::Active)
            .bind(loan.created_at)
            .bind(loan.updated_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!(loan_id = %loan.loan_id, book_id = %loan.book_id, "issued loan");
        self.get(loan.loan_id.as_str()).await
    }

    async fn mark_returned(&self, loan_id: &str, return_date: NaiveDate) -> LibraryResult<bool> {
        let now = Utc::now().naive_utc();
        let mut tx = self.pool.begin().await?;
        let closed = sqlx::query(
            "UPDATE loans SET loan_status = ?, return_date = ?, version = version + 1, updated_at = ? \
             WHERE loan_id = ? AND loan_status = ?")
            .bind(LoanStatus::Returned)
            .bind(return_date)
            .bind(now)
            .bind(loan_id)
            .bind(LoanStatus::Active)
            .execute(&mut *tx)
            .await?;
        if closed.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM loans WHERE loan_id = ?")
                .bind(loan_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            return if exists == 0 {
                Err(LibraryError::not_found(format!("loan not found for {}", loan_id).as_str()))
            } else {
                debug!(loan_id, "loan was already returned");
                Ok(false)
            };
        }
        let restocked = sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1, version = version + 1, updated_at = ? \
             WHERE book_id = (SELECT book_id FROM loans WHERE loan_id = ?) AND available_copies < total_copies")
            .bind(now)
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;
        if restocked.rows_affected() == 0 {
            // stock was edited by hand while the copy was out
            warn!(loan_id, "book already holds all its copies, stock left unchanged");
        }
        tx.commit().await?;
        debug!(loan_id, %return_date, "returned loan");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use crate::authors::domain::model::AuthorEntity;
    use crate::authors::repository::sqlite_author_repository::SqliteAuthorRepository;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::sqlite_book_repository::SqliteBookRepository;
    use crate::core::library::{LibraryError, LoanStatus};
    use crate::core::repository::Repository;
    use crate::loans::domain::model::LoanEntity;
    use crate::loans::repository::LoanRepository;
    use crate::loans::repository::sqlite_loan_repository::SqliteLoanRepository;
    use crate::members::domain::model::MemberEntity;
    use crate::members::repository::sqlite_member_repository::SqliteMemberRepository;
    use crate::utils::db::create_test_pool;

    struct Fixture {
        pool: SqlitePool,
        loans_repo: SqliteLoanRepository,
        books_repo: SqliteBookRepository,
        member: MemberEntity,
        book: BookEntity,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("should build date")
    }

    async fn setup(copies: i64) -> Fixture {
        let pool = create_test_pool().await;
        let author = AuthorEntity::new("Machado de Assis", None);
        SqliteAuthorRepository::new(pool.clone()).create(&author).await.expect("should create author");
        let book = BookEntity::new("Dom Casmurro", author.author_id.as_str(), author.name.as_str(),
                                   "Garnier", 1899, copies, copies);
        let books_repo = SqliteBookRepository::new(pool.clone());
        books_repo.create(&book).await.expect("should create book");
        let member = MemberEntity::new("Ana Souza", "ana@example.com", "Student");
        SqliteMemberRepository::new(pool.clone()).create(&member).await.expect("should create member");
        Fixture { loans_repo: SqliteLoanRepository::new(pool.clone()), pool, books_repo, member, book }
    }

    fn new_loan(fx: &Fixture, issued: u32) -> LoanEntity {
        LoanEntity::new(fx.member.member_id.as_str(), fx.book.book_id.as_str(), day(issued), day(issued + 7))
    }

    async fn available(fx: &Fixture) -> i64 {
        fx.books_repo.get(fx.book.book_id.as_str()).await.expect("should return book").available_copies
    }

    #[tokio::test]
    async fn test_should_issue_and_return_loan() {
        let fx = setup(3).await;
        let loan = fx.loans_repo.issue(&new_loan(&fx, 1)).await.expect("should issue loan");
        assert_eq!("Dom Casmurro", loan.book_title.as_str());
        assert_eq!("Ana Souza", loan.member_name.as_str());
        assert_eq!(LoanStatus::Active, loan.loan_status);
        assert_eq!(2, available(&fx).await);

        assert!(fx.loans_repo.mark_returned(loan.loan_id.as_str(), day(5)).await.expect("should return loan"));
        let loaded = fx.loans_repo.get(loan.loan_id.as_str()).await.expect("should return loan");
        assert_eq!(LoanStatus::Returned, loaded.loan_status);
        assert_eq!(Some(day(5)), loaded.return_date);
        assert_eq!(3, available(&fx).await);
    }

    #[tokio::test]
    async fn test_should_ignore_second_return() {
        let fx = setup(1).await;
        let loan = fx.loans_repo.issue(&new_loan(&fx, 1)).await.expect("should issue loan");
        assert!(fx.loans_repo.mark_returned(loan.loan_id.as_str(), day(2)).await.expect("should return loan"));
        assert!(!fx.loans_repo.mark_returned(loan.loan_id.as_str(), day(3)).await.expect("should ignore return"));
        assert_eq!(1, available(&fx).await);
        let loaded = fx.loans_repo.get(loan.loan_id.as_str()).await.expect("should return loan");
        assert_eq!(Some(day(2)), loaded.return_date);
        assert!(matches!(fx.loans_repo.mark_returned("missing", day(3)).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_reject_issue_without_stock() {
        let fx = setup(0).await;
        let res = fx.loans_repo.issue(&new_loan(&fx, 1)).await;
        assert!(matches!(res, Err(LibraryError::Validation { reason_code: Some(ref f), .. }) if f == "book"));
        let res = fx.loans_repo.query(&HashMap::new(), None, 10).await.expect("should query loans");
        assert!(res.records.is_empty());
        assert_eq!(0, available(&fx).await);

        let mut loan = new_loan(&fx, 1);
        loan.book_id = "missing".to_string();
        assert!(matches!(fx.loans_repo.issue(&loan).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_roll_back_stock_for_unknown_member() {
        let fx = setup(2).await;
        let mut loan = new_loan(&fx, 1);
        loan.member_id = "missing".to_string();
        assert!(matches!(fx.loans_repo.issue(&loan).await, Err(LibraryError::Validation { .. })));
        assert_eq!(2, available(&fx).await);
    }

    #[tokio::test]
    async fn test_should_lend_last_copy_once() {
        let fx = setup(1).await;
        let (a, b) = (new_loan(&fx, 1), new_loan(&fx, 1));
        let (first, second) = tokio::join!(fx.loans_repo.issue(&a), fx.loans_repo.issue(&b));
        assert_eq!(1, [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count());
        assert_eq!(0, available(&fx).await);
    }

    #[tokio::test]
    async fn test_should_keep_stock_within_total_on_return() {
        let fx = setup(1).await;
        let loan = fx.loans_repo.issue(&new_loan(&fx, 1)).await.expect("should issue loan");
        sqlx::query("UPDATE books SET available_copies = total_copies").execute(&fx.pool).await.expect("should restock");
        assert!(fx.loans_repo.mark_returned(loan.loan_id.as_str(), day(2)).await.expect("should return loan"));
        assert_eq!(1, available(&fx).await);
    }

    #[tokio::test]
    async fn test_should_query_loans() {
        let fx = setup(5).await;
        let older = fx.loans_repo.issue(&new_loan(&fx, 1)).await.expect("should issue loan");
        let newer = fx.loans_repo.issue(&new_loan(&fx, 10)).await.expect("should issue loan");
        fx.loans_repo.mark_returned(newer.loan_id.as_str(), day(11)).await.expect("should return loan");

        let res = fx.loans_repo.query(&HashMap::new(), None, 10).await.expect("should query loans");
        assert_eq!(vec![newer.loan_id.clone(), older.loan_id.clone()],
                   res.records.iter().map(|l| l.loan_id.clone()).collect::<Vec<_>>());

        let res = fx.loans_repo.query(&HashMap::from([
            ("loan_status".to_string(), "Active".to_string()),
            ("due_date:<".to_string(), "2024-03-09".to_string()),
        ]), None, 10).await.expect("should query loans");
        assert_eq!(1, res.records.len());
        assert_eq!(older.loan_id, res.records[0].loan_id);

        let res = fx.loans_repo.query(&HashMap::from([("q".to_string(), "casmurro".to_string())]), None, 1)
            .await.expect("should query loans");
        assert_eq!(1, res.records.len());
        assert_eq!(Some("1".to_string()), res.next_page);
    }
}
