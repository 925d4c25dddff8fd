//! Configuration loading and representation.
//!
//! All settings come from environment variables with development defaults.

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "WAREHOUSE_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "WAREHOUSE_DB_MAX_CONNECTIONS";
pub const CANCEL_KEYWORD_VAR: &str = "WAREHOUSE_CANCEL_KEYWORD";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://warehouse.db";
pub const DEFAULT_CANCEL_KEYWORD: &str = "cancel";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Process configuration for the warehouse programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// SQLx connection URL; the database file is created when missing.
    pub database_url: String,
    /// Pool size. One connection per process unless overridden.
    pub max_connections: u32,
    /// Word that aborts any console prompt.
    pub cancel_keyword: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
            cancel_keyword: DEFAULT_CANCEL_KEYWORD.to_string(),
        }
    }
}

impl WarehouseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty(DATABASE_URL_VAR));
            }
            config.database_url = url.to_string();
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: MAX_CONNECTIONS_VAR,
                        value: raw,
                    });
                }
            };
        }

        if let Some(keyword) = lookup(CANCEL_KEYWORD_VAR) {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(ConfigError::Empty(CANCEL_KEYWORD_VAR));
            }
            config.cancel_keyword = keyword.to_string();
        }

        Ok(config)
    }
}
