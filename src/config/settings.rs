//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_EXPORT_DIR,
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_SESSION_PATH, DEFAULT_TOP_SELLERS_LIMIT,
};
use crate::domain::RevenueBasis;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub session_path: PathBuf,
    pub export_dir: PathBuf,
    pub top_sellers_limit: u64,
    pub low_stock_threshold: i32,
    pub category_revenue_basis: RevenueBasis,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("session_path", &self.session_path)
            .field("export_dir", &self.export_dir)
            .field("top_sellers_limit", &self.top_sellers_limit)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .field("category_revenue_basis", &self.category_revenue_basis)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            top_sellers_limit: DEFAULT_TOP_SELLERS_LIMIT,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            category_revenue_basis: RevenueBasis::default(),
        }
    }
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            session_path: env::var("SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            export_dir: env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            top_sellers_limit: parsed_var("TOP_SELLERS_LIMIT")
                .unwrap_or(defaults.top_sellers_limit),
            low_stock_threshold: parsed_var("LOW_STOCK_THRESHOLD")
                .unwrap_or(defaults.low_stock_threshold),
            category_revenue_basis: parsed_var("CATEGORY_REVENUE_BASIS")
                .unwrap_or(defaults.category_revenue_basis),
        }
    }

    /// Configuration pointing at another database, everything else default.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Whether the configured database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(Config::with_database_url("sqlite::memory:").is_in_memory());
        assert!(!Config::default().is_in_memory());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = Config::with_database_url("sqlite:///secret/location.db");
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret"));
    }
}
