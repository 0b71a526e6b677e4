use std::sync::Arc;
use sqlx::SqlitePool;
use crate::catalog::factory::create_catalog_service;
use crate::core::domain::Configuration;
use crate::gateway::factory::create_publisher;
use crate::loans::domain::LoanService;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::sqlite_loan_repository::SqliteLoanRepository;
use crate::members::factory::create_member_service;
use crate::utils::date::Clock;

pub(crate) fn create_loan_repository(pool: &SqlitePool) -> Box<dyn LoanRepository> {
    Box::new(SqliteLoanRepository::new(pool.clone()))
}

pub(crate) fn create_loan_service(config: &Configuration, pool: &SqlitePool, clock: Arc<dyn Clock>) -> Box<dyn LoanService> {
    let loan_repo = create_loan_repository(pool);
    let member_svc = create_member_service(config, pool);
    let catalog_svc = create_catalog_service(config, pool);
    let publisher = create_publisher(config);
    Box::new(LoanServiceImpl::new(config, clock, loan_repo, member_svc, catalog_svc, publisher))
}
