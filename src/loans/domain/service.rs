use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, PaginatedResult};
use crate::core::validation::{validate_choice, INVALID_CHOICE};
use crate::gateway::events::{publish_after_commit, EventPublisher};
use crate::loans::domain::{default_due_date, BulkReturnReport, LoanService};
use crate::loans::domain::model::LoanEntity;
use crate::loans::dto::LoanDto;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::sqlite_loan_repository::NO_COPIES_AVAILABLE;
use crate::members::domain::MemberService;
use crate::utils::date::{Clock, DAY_FMT};

pub(crate) struct LoanServiceImpl {
    branch_id: String,
    loan_days: i64,
    clock: Arc<dyn Clock>,
    loan_repository: Box<dyn LoanRepository>,
    member_service: Box<dyn MemberService>,
    catalog_service: Box<dyn CatalogService>,
    events_publisher: Box<dyn EventPublisher>,
}

// a reference picked from a select box that no longer resolves is a bad choice of that field
fn invalid_choice(err: LibraryError, field: &str) -> LibraryError {
    match err {
        LibraryError::NotFound { .. } => LibraryError::validation(INVALID_CHOICE, Some(field.to_string())),
        other => other,
    }
}

impl LoanServiceImpl {
    pub(crate) fn new(config: &Configuration, clock: Arc<dyn Clock>,
                      loan_repository: Box<dyn LoanRepository>,
                      member_service: Box<dyn MemberService>,
                      catalog_service: Box<dyn CatalogService>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            loan_days: config.loan_days,
            clock,
            loan_repository,
            member_service,
            catalog_service,
            events_publisher,
        }
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([("branch_id".to_string(), self.branch_id.to_string())])
    }
}

#[async_trait]
impl LoanService for LoanServiceImpl {
    async fn issue_loan(&self, member_id: &str, book_id: &str) -> LibraryResult<LoanDto> {
        validate_choice("member", member_id)?;
        validate_choice("book", book_id)?;
        let member = self.member_service.find_member_by_id(member_id).await
            .map_err(|err| invalid_choice(err, "member"))?;
        let book = self.catalog_service.find_book_by_id(book_id).await
            .map_err(|err| invalid_choice(err, "book"))?;
        if !book.is_available() {
            return Err(LibraryError::validation(NO_COPIES_AVAILABLE, Some("book".to_string())));
        }
        let today = self.clock.today();
        let loan = LoanDto::new(&member, &book, today, default_due_date(today, self.loan_days));
        // the repository re-checks stock inside its transaction
        let saved = self.loan_repository.issue(&LoanEntity::from(&loan)).await
            .map_err(|err| invalid_choice(err, "book"))?;
        let loan = LoanDto::from(&saved);
        info!(loan_id = %loan.loan_id, book_id, member_id, due_date = %loan.due_date.format(DAY_FMT), "issued loan");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::added(
            "loan_issued", "loans", &self.metadata(), &loan)).await;
        Ok(loan)
    }

    async fn return_loan(&self, loan_id: &str) -> LibraryResult<Option<LoanDto>> {
        if !self.loan_repository.mark_returned(loan_id, self.clock.today()).await? {
            return Ok(None);
        }
        let loan = LoanDto::from(&self.loan_repository.get(loan_id).await?);
        info!(loan_id, book_id = %loan.book_id, "returned loan");
        publish_after_commit(self.events_publisher.as_ref(), DomainEvent::updated(
            "loan_returned", "loans", &self.metadata(), &loan)).await;
        Ok(Some(loan))
    }

    async fn return_loans(&self, loan_ids: &[String]) -> BulkReturnReport {
        let mut report = BulkReturnReport::default();
        for loan_id in loan_ids {
            match self.return_loan(loan_id.as_str()).await {
                Ok(Some(loan)) => report.returned.push(loan),
                Ok(None) => report.skipped += 1,
                Err(err) => {
                    warn!(loan_id = %loan_id, error = %err, returned = report.returned.len(), "bulk return stopped");
                    report.failure = Some(err.message().to_string());
                    break;
                }
            }
        }
        report
    }

    async fn find_loan_by_id(&self, id: &str) -> LibraryResult<LoanDto> {
        self.loan_repository.get(id).await.map(|l| LoanDto::from(&l))
    }

    async fn query_loans(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>> {
        let res = self.loan_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(LoanDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }

    // active loans whose due date is before today
    async fn query_overdue(&self, predicate: &HashMap<String, String>,
                           page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>> {
        let mut predicate = predicate.clone();
        predicate.insert("loan_status".to_string(), LoanStatus::Active.to_string());
        predicate.insert("due_date:<".to_string(), self.clock.today().format(DAY_FMT).to_string());
        self.query_loans(&predicate, page, page_size).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use crate::authors::dto::AuthorDto;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory::create_catalog_service;
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, LoanStatus};
    use crate::gateway::events::testing::FailingPublisher;
    use crate::loans::domain::LoanService;
    use crate::loans::domain::service::LoanServiceImpl;
    use crate::loans::factory::{create_loan_repository, create_loan_service};
    use crate::members::dto::MemberDto;
    use crate::members::factory::create_member_service;
    use crate::utils::date::{FixedClock, SystemClock};
    use crate::utils::db::{build_pool, create_test_pool};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("should build date")
    }

    async fn setup(copies: i64) -> (SqlitePool, BookDto, MemberDto) {
        let pool = create_test_pool().await;
        let config = Configuration::new("test");
        let catalog_svc = create_catalog_service(&config, &pool);
        let author = catalog_svc.add_author(&AuthorDto::new("Machado de Assis", None)).await.expect("should add author");
        let book = catalog_svc.add_book(&BookDto::new("Dom Casmurro", &author, "Garnier", 1899, copies, copies))
            .await.expect("should add book");
        let member = create_member_service(&config, &pool)
            .add_member(&MemberDto::new("Ana Souza", "ana@example.com", "Student")).await.expect("should add member");
        (pool, book, member)
    }

    fn build_service(pool: &SqlitePool, today: u32) -> Box<dyn LoanService> {
        create_loan_service(&Configuration::new("test"), pool, Arc::new(FixedClock::new(day(today))))
    }

    async fn available(pool: &SqlitePool, book: &BookDto) -> i64 {
        create_catalog_service(&Configuration::new("test"), pool)
            .find_book_by_id(book.book_id.as_str()).await.expect("should return book").available_copies
    }

    #[tokio::test]
    async fn test_should_issue_and_return_loan() {
        let (pool, book, member) = setup(3).await;
        let loan = build_service(&pool, 1).issue_loan(member.member_id.as_str(), book.book_id.as_str())
            .await.expect("should issue loan");
        assert_eq!(day(1), loan.issue_date);
        assert_eq!(day(8), loan.due_date);
        assert_eq!(LoanStatus::Active, loan.loan_status);
        assert_eq!(2, available(&pool, &book).await);

        let returned = build_service(&pool, 4).return_loan(loan.loan_id.as_str())
            .await.expect("should return loan").expect("should be returned now");
        assert_eq!(Some(day(4)), returned.return_date);
        assert_eq!(LoanStatus::Returned, returned.loan_status);
        assert_eq!(3, available(&pool, &book).await);

        assert_eq!(None, build_service(&pool, 5).return_loan(loan.loan_id.as_str()).await.expect("should ignore return"));
        assert_eq!(3, available(&pool, &book).await);
    }

    #[tokio::test]
    async fn test_should_reject_loan_without_stock() {
        let (pool, book, member) = setup(0).await;
        let res = build_service(&pool, 1).issue_loan(member.member_id.as_str(), book.book_id.as_str()).await;
        match res {
            Err(LibraryError::Validation { message, reason_code }) => {
                assert_eq!("This book has no copies available in stock.", message.as_str());
                assert_eq!(Some("book".to_string()), reason_code);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_should_reject_unknown_choices() {
        let (pool, book, member) = setup(1).await;
        let loan_svc = build_service(&pool, 1);
        let res = loan_svc.issue_loan("missing", book.book_id.as_str()).await;
        assert!(matches!(res, Err(LibraryError::Validation { reason_code: Some(ref f), .. }) if f == "member"));
        let res = loan_svc.issue_loan(member.member_id.as_str(), "missing").await;
        assert!(matches!(res, Err(LibraryError::Validation { reason_code: Some(ref f), .. }) if f == "book"));
        let res = loan_svc.issue_loan(member.member_id.as_str(), "").await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        assert_eq!(1, available(&pool, &book).await);
    }

    #[tokio::test]
    async fn test_should_return_loans_until_first_failure() {
        let (pool, book, member) = setup(3).await;
        let loan_svc = build_service(&pool, 1);
        let first = loan_svc.issue_loan(member.member_id.as_str(), book.book_id.as_str()).await.expect("should issue loan");
        let second = loan_svc.issue_loan(member.member_id.as_str(), book.book_id.as_str()).await.expect("should issue loan");
        let third = loan_svc.issue_loan(member.member_id.as_str(), book.book_id.as_str()).await.expect("should issue loan");
        loan_svc.return_loan(second.loan_id.as_str()).await.expect("should return loan");

        let report = loan_svc.return_loans(&[first.loan_id.clone(), second.loan_id.clone(),
                                             "missing".to_string(), third.loan_id.clone()]).await;
        assert_eq!(1, report.returned.len());
        assert_eq!(1, report.skipped);
        assert!(report.failure.is_some());
        // the loan after the failure stays out
        assert_eq!(LoanStatus::Active, loan_svc.find_loan_by_id(third.loan_id.as_str())
            .await.expect("should return loan").loan_status);
        assert_eq!(2, available(&pool, &book).await);
    }

    #[tokio::test]
    async fn test_should_query_overdue_loans() {
        let (pool, book, member) = setup(3).await;
        let early = build_service(&pool, 1).issue_loan(member.member_id.as_str(), book.book_id.as_str())
            .await.expect("should issue loan");
        build_service(&pool, 5).issue_loan(member.member_id.as_str(), book.book_id.as_str())
            .await.expect("should issue loan");

        let res = build_service(&pool, 10).query_overdue(&HashMap::new(), None, 10).await.expect("should query loans");
        assert_eq!(1, res.records.len());
        assert_eq!(early.loan_id, res.records[0].loan_id);
        // due today is not overdue yet
        let res = build_service(&pool, 8).query_overdue(&HashMap::new(), None, 10).await.expect("should query loans");
        assert!(res.records.is_empty());
    }

    #[tokio::test]
    async fn test_should_keep_loan_when_publishing_fails() {
        let (pool, book, member) = setup(1).await;
        let config = Configuration::new("test");
        let loan_svc = LoanServiceImpl::new(&config, Arc::new(FixedClock::new(day(1))),
                                            create_loan_repository(&pool),
                                            create_member_service(&config, &pool),
                                            create_catalog_service(&config, &pool),
                                            Box::new(FailingPublisher));
        let loan = loan_svc.issue_loan(member.member_id.as_str(), book.book_id.as_str()).await.expect("should issue loan");
        assert_eq!(0, available(&pool, &book).await);
        assert!(loan_svc.return_loan(loan.loan_id.as_str()).await.expect("should return loan").is_some());
        assert_eq!(1, available(&pool, &book).await);
    }

    #[tokio::test]
    async fn test_should_not_lend_more_copies_than_stock() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let mut config = Configuration::new("test");
        config.database_url = format!("sqlite://{}?mode=rwc", dir.path().join("library.db").display());
        let pool = build_pool(&config).await.expect("should open file database");
        let catalog_svc = create_catalog_service(&config, &pool);
        let author = catalog_svc.add_author(&AuthorDto::new("Machado de Assis", None)).await.expect("should add author");
        let book = catalog_svc.add_book(&BookDto::new("Dom Casmurro", &author, "Garnier", 1899, 3, 3))
            .await.expect("should add book");
        let member = create_member_service(&config, &pool)
            .add_member(&MemberDto::new("Ana Souza", "ana@example.com", "Student")).await.expect("should add member");

        let mut handles = vec![];
        for _ in 0..8 {
            let (config, pool) = (config.clone(), pool.clone());
            let (member_id, book_id) = (member.member_id.clone(), book.book_id.clone());
            handles.push(tokio::spawn(async move {
                create_loan_service(&config, &pool, Arc::new(SystemClock))
                    .issue_loan(member_id.as_str(), book_id.as_str()).await
            }));
        }
        let mut issued = 0;
        for handle in handles {
            match handle.await.expect("task should finish") {
                Ok(_) => issued += 1,
                Err(err) => assert!(matches!(err, LibraryError::Validation { .. }), "unexpected {:?}", err),
            }
        }
        assert_eq!(3, issued);
        assert_eq!(0, available(&pool, &book).await);
    }
}
