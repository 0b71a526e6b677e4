use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::Duration;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// predicate key that searches across several text columns at once
pub(crate) const SEARCH_KEY: &str = "q";

// DbConfig describes how the sqlite pool is opened
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn new(database_url: &str) -> Self {
        DbConfig {
            database_url: database_url.to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    // in-memory databases live as long as their single connection
    pub fn in_memory() -> Self {
        DbConfig {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl From<&Configuration> for DbConfig {
    fn from(config: &Configuration) -> Self {
        let mut db_config = DbConfig::new(config.database_url.as_str());
        if db_config.is_memory() {
            db_config.max_connections = 1;
        }
        db_config
    }
}

pub async fn connect(config: &DbConfig) -> LibraryResult<SqlitePool> {
    info!(url = %config.database_url, max_connections = config.max_connections, "opening sqlite pool");
    let mut options = SqliteConnectOptions::from_str(config.database_url.as_str())?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);
    if !config.is_memory() {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout);
    if config.is_memory() {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }
    Ok(pool_options.connect_with(options).await?)
}

pub async fn run_migrations(pool: &SqlitePool) -> LibraryResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "database schema is up to date");
    Ok(())
}

// opens the pool named by the configuration and brings its schema up to date
pub async fn build_pool(config: &Configuration) -> LibraryResult<SqlitePool> {
    let pool = connect(&DbConfig::from(config)).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub fn setup_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_ansi(false)
        .json()
        .try_init();
}

// page tokens are plain row offsets
pub(crate) fn page_offset(page: Option<&str>) -> LibraryResult<i64> {
    match page {
        None | Some("") => Ok(0),
        Some(token) => token.parse::<i64>().ok().filter(|n| *n >= 0).ok_or_else(|| {
            LibraryError::validation(format!("invalid page token {:?}", token).as_str(), None)
        }),
    }
}

// appends LIMIT/OFFSET fetching one extra row to learn whether another page exists
pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, offset: i64, page_size: usize) {
    builder.push(" LIMIT ").push_bind(page_size as i64 + 1).push(" OFFSET ").push_bind(offset);
}

pub(crate) fn to_paginated<T>(page: Option<&str>, offset: i64, page_size: usize,
                              mut records: Vec<T>) -> PaginatedResult<T> {
    let next_page = if records.len() > page_size {
        records.truncate(page_size);
        Some(format!("{}", offset + page_size as i64))
    } else {
        None
    };
    PaginatedResult::new(page, page_size, next_page, records)
}

// Translates a predicate map into AND-ed conditions. Keys are `field` (equality),
// `field:like` (substring), `field:<` and `field:>=`; the `q` key matches any of the
// search columns. Fields must be listed in `columns`, which maps them to sql expressions.
pub(crate) fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>,
                             predicate: &HashMap<String, String>,
                             columns: &[(&str, &str)],
                             search_columns: &[&str]) -> LibraryResult<()> {
    let sorted: BTreeMap<&String, &String> = predicate.iter().collect();
    for (key, value) in sorted {
        if value.trim().is_empty() {
            continue;
        }
        if key.as_str() == SEARCH_KEY {
            if search_columns.is_empty() {
                return Err(LibraryError::validation("search is not supported here", None));
            }
            let pattern = format!("%{}%", value.trim());
            builder.push(" AND (");
            for (i, column) in search_columns.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push(*column).push(" LIKE ").push_bind(pattern.clone());
            }
            builder.push(")");
            continue;
        }
        let (field, op) = key.split_once(':').unwrap_or((key.as_str(), "="));
        let column = columns.iter().find(|(name, _)| *name == field).map(|(_, column)| *column)
            .ok_or_else(|| LibraryError::validation(format!("unknown filter {}", field).as_str(), None))?;
        builder.push(" AND ").push(column);
        match op {
            "=" => { builder.push(" = ").push_bind(value.to_string()); }
            "like" => { builder.push(" LIKE ").push_bind(format!("%{}%", value.trim())); }
            "<" => { builder.push(" < ").push_bind(value.to_string()); }
            ">=" => { builder.push(" >= ").push_bind(value.to_string()); }
            _ => {
                return Err(LibraryError::validation(format!("unknown filter operator {}", op).as_str(), None));
            }
        }
    }
    Ok(())
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                LibraryError::not_found("record not found")
            }
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                if db_err.is_unique_violation() {
                    LibraryError::duplicate_key(db_err.message())
                } else if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                    LibraryError::validation(db_err.message(), code)
                } else {
                    LibraryError::database_or_unavailable(db_err.message(), code, false)
                }
            }
            sqlx::Error::PoolTimedOut => {
                LibraryError::unavailable("timed out waiting for a database connection", None, true)
            }
            other => {
                LibraryError::database(format!("{}", other).as_str(), None, false)
            }
        }
    }
}

impl From<sqlx::migrate::MigrateError> for LibraryError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        LibraryError::database(format!("migration failed {}", err).as_str(), None, false)
    }
}

#[cfg(test)]
pub(crate) async fn create_test_pool() -> SqlitePool {
    let pool = connect(&DbConfig::in_memory()).await.expect("should open in-memory database");
    run_migrations(&pool).await.expect("should migrate database");
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use sqlx::{QueryBuilder, Sqlite};
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::utils::db::{build_pool, create_test_pool, page_offset, push_predicate, to_paginated, DbConfig};

    #[tokio::test]
    async fn test_should_migrate_in_memory_database() {
        let pool = create_test_pool().await;
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name")
            .fetch_all(&pool).await.expect("should list tables");
        assert_eq!(vec!["authors", "books", "loans", "members"], tables);
    }

    #[tokio::test]
    async fn test_should_open_file_database_in_wal_mode() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let mut config = Configuration::new("test");
        config.database_url = format!("sqlite://{}?mode=rwc", dir.path().join("library.db").display());
        let pool = build_pool(&config).await.expect("should open file database");
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode").fetch_one(&pool).await.expect("should read pragma");
        assert_eq!("wal", mode.to_lowercase());
        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("should read pragma");
        assert_eq!(1, fk);
    }

    #[tokio::test]
    async fn test_should_detect_memory_urls() {
        assert!(DbConfig::in_memory().is_memory());
        assert!(!DbConfig::new("sqlite://library.db").is_memory());
    }

    #[tokio::test]
    async fn test_should_parse_page_offset() {
        assert_eq!(0, page_offset(None).expect("should parse"));
        assert_eq!(100, page_offset(Some("100")).expect("should parse"));
        assert!(page_offset(Some("-1")).is_err());
        assert!(page_offset(Some("abc")).is_err());
    }

    #[tokio::test]
    async fn test_should_build_next_page() {
        let res = to_paginated(None, 0, 2, vec![1, 2, 3]);
        assert_eq!(vec![1, 2], res.records);
        assert_eq!(Some("2".to_string()), res.next_page);
        let res = to_paginated(Some("2"), 2, 2, vec![3]);
        assert_eq!(None, res.next_page);
    }

    #[tokio::test]
    async fn test_should_build_predicate_sql() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");
        let predicate = HashMap::from([
            ("year".to_string(), "1999".to_string()),
            ("publisher:like".to_string(), "penguin".to_string()),
            ("q".to_string(), "dune".to_string()),
        ]);
        push_predicate(&mut builder, &predicate, &[("year", "year"), ("publisher", "publisher")], &["title"])
            .expect("should build predicate");
        assert_eq!("SELECT * FROM books WHERE 1 = 1 AND publisher LIKE ? AND (title LIKE ?) AND year = ?", builder.sql());
    }

    #[tokio::test]
    async fn test_should_reject_unknown_filter() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");
        let predicate = HashMap::from([("1=1; DROP TABLE books".to_string(), "x".to_string())]);
        let res = push_predicate(&mut builder, &predicate, &[("year", "year")], &[]);
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_map_sqlx_errors() {
        assert!(matches!(LibraryError::from(sqlx::Error::RowNotFound), LibraryError::NotFound { .. }));
        let err = LibraryError::from(sqlx::Error::PoolTimedOut);
        assert!(err.retryable());
    }
}
