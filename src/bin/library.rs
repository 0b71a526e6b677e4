use std::net::SocketAddr;
use tracing::info;
use library_loans::core::controller::AppState;
use library_loans::core::domain::Configuration;
use library_loans::core::library::{LibraryError, LibraryResult};
use library_loans::routes::build_router;
use library_loans::utils::db::{build_pool, setup_tracing};

#[tokio::main]
async fn main() -> LibraryResult<()> {
    let config = Configuration::from_env()?;
    setup_tracing(config.log_level.as_str());

    let addr: SocketAddr = config.bind_address.parse().map_err(|err| LibraryError::validation(
        format!("invalid LIBRARY_BIND {}: {}", config.bind_address, err).as_str(), Some("bind_address".to_string())))?;
    let pool = build_pool(&config).await?;
    info!(branch_id = %config.branch_id, %addr, loan_days = config.loan_days, "starting library server");

    let app = build_router(AppState::new(config, pool));
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| LibraryError::runtime(format!("server failed {}", err).as_str(), None))
}
