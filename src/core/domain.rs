use std::env;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

pub const DEFAULT_LOAN_DAYS: i64 = 7;
pub const DEFAULT_PAGE_SIZE: usize = 50;

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub loan_days: i64,
    pub page_size: usize,
    pub bind_address: String,
    pub database_url: String,
    pub log_level: String,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            loan_days: DEFAULT_LOAN_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            bind_address: "127.0.0.1:8000".to_string(),
            database_url: "sqlite://library.db?mode=rwc".to_string(),
            log_level: "info".to_string(),
        }
    }

    // loads configuration from LIBRARY_* environment variables on top of the defaults
    pub fn from_env() -> LibraryResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> LibraryResult<Self>
        where F: Fn(&str) -> Option<String> {
        let mut config = Configuration::new(
            lookup("LIBRARY_BRANCH").unwrap_or_else(|| "main".to_string()).as_str());
        if let Some(days) = lookup("LIBRARY_LOAN_DAYS") {
            config.loan_days = parse_positive("LIBRARY_LOAN_DAYS", &days)?;
        }
        if let Some(size) = lookup("LIBRARY_PAGE_SIZE") {
            config.page_size = parse_positive("LIBRARY_PAGE_SIZE", &size)? as usize;
        }
        if let Some(bind) = lookup("LIBRARY_BIND") {
            config.bind_address = bind;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(level) = lookup("LIBRARY_LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }
        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> LibraryResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LibraryError::validation(
            format!("invalid value {:?} for {}", value, key).as_str(), Some("config".to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.branch_id.as_str());
        assert_eq!(7, config.loan_days);
        assert_eq!(50, config.page_size);
    }

    #[tokio::test]
    async fn test_should_load_config_overrides() {
        let vars = HashMap::from([
            ("LIBRARY_BRANCH", "downtown"),
            ("LIBRARY_LOAN_DAYS", "14"),
            ("LIBRARY_PAGE_SIZE", "20"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("LIBRARY_LOG_LEVEL", "DEBUG"),
        ]);
        let config = Configuration::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
            .expect("should load config");
        assert_eq!("downtown", config.branch_id.as_str());
        assert_eq!(14, config.loan_days);
        assert_eq!(20, config.page_size);
        assert_eq!("sqlite::memory:", config.database_url.as_str());
        assert_eq!("debug", config.log_level.as_str());
        assert_eq!("127.0.0.1:8000", config.bind_address.as_str());
    }

    #[tokio::test]
    async fn test_should_reject_invalid_numbers() {
        let vars = HashMap::from([("LIBRARY_LOAN_DAYS", "seven")]);
        assert!(Configuration::from_lookup(|k| vars.get(k).map(|v| v.to_string())).is_err());
        let vars = HashMap::from([("LIBRARY_PAGE_SIZE", "0")]);
        assert!(Configuration::from_lookup(|k| vars.get(k).map(|v| v.to_string())).is_err());
    }
}
