use std::sync::Arc;
use axum::http::StatusCode;
use axum::response::Html;
use sqlx::SqlitePool;
use tracing::error;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::LibraryError;
use crate::core::view::{page, Message};
use crate::utils::date::{Clock, SystemClock};

// AppState is shared by all handlers: immutable configuration, the pool and the clock
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Configuration,
    pub pool: SqlitePool,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Configuration, pool: SqlitePool) -> AppState {
        AppState {
            config,
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> AppState {
        self.clock = clock;
        self
    }
}

pub type ServerError = (StatusCode, Html<String>);

pub(crate) fn error_page(status: StatusCode, message: &str) -> ServerError {
    let title = status.canonical_reason().unwrap_or("Error");
    (status, page(title, &[Message::error(message)], ""))
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::DuplicateKey { .. } => StatusCode::CONFLICT,
            CommandError::NotFound { .. } => StatusCode::NOT_FOUND,
            CommandError::Runtime { retryable: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
            CommandError::Runtime { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::Serialization { .. } => StatusCode::BAD_REQUEST,
            CommandError::Validation { .. } => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            error!(error = %err, "request failed");
        }
        error_page(status, err.message())
    }
}

impl From<LibraryError> for ServerError {
    fn from(err: LibraryError) -> Self {
        ServerError::from(CommandError::from(err))
    }
}

pub async fn index() -> Html<String> {
    page("Welcome to the Library!", &[],
         "<p>This is the home page of your library application.</p>")
}

pub async fn not_found() -> ServerError {
    error_page(StatusCode::NOT_FOUND, "The requested page does not exist.")
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use crate::core::command::CommandError;
    use crate::core::controller::{index, not_found, ServerError};
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_render_index() {
        let html = index().await.0;
        assert!(html.contains("Welcome to the Library!"));
    }

    #[tokio::test]
    async fn test_should_map_command_errors() {
        let (status, _) = ServerError::from(CommandError::NotFound { message: "missing".to_string() });
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, html) = ServerError::from(CommandError::Validation { message: "bad <input>".to_string(), reason_code: None });
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(html.0.contains("bad &lt;input&gt;"));
        let (status, _) = ServerError::from(LibraryError::unavailable("busy", None, true));
        assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
        let (status, _) = ServerError::from(LibraryError::duplicate_key("dup"));
        assert_eq!(StatusCode::CONFLICT, status);
    }

    #[tokio::test]
    async fn test_should_render_not_found() {
        let (status, _) = not_found().await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    }
}
