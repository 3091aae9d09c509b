//! Configuration management for the token usage service
//!
//! Configuration is loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::retry::RetryPolicy;

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// PostgreSQL connection string
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub database_max_connections: u32,
    /// Number of connection attempts made at startup before giving up
    pub database_connect_attempts: u32,
    /// Delay before the first reconnect; doubled after every failure
    pub database_connect_base_delay: Duration,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_delay_ms: u64 = var_or("DATABASE_CONNECT_BASE_DELAY_MS", "2000")
            .parse()
            .context("Invalid DATABASE_CONNECT_BASE_DELAY_MS")?;

        let log_format = match var_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => anyhow::bail!("Invalid LOG_FORMAT '{}': expected 'text' or 'json'", other),
        };

        Ok(Self {
            host: var_or("TOKEN_USAGE_HOST", "0.0.0.0"),
            port: var_or("TOKEN_USAGE_PORT", "5001")
                .parse()
                .context("Invalid TOKEN_USAGE_PORT")?,

            database_url: lookup("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .context("DATABASE_URL environment variable not set")?,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", "10")
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            database_connect_attempts: var_or("DATABASE_CONNECT_ATTEMPTS", "5")
                .parse()
                .context("Invalid DATABASE_CONNECT_ATTEMPTS")?,
            database_connect_base_delay: Duration::from_millis(base_delay_ms),

            log_format,
        })
    }

    /// Retry policy guarding the initial database connection
    pub fn connect_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.database_connect_attempts,
            self.database_connect_base_delay,
        )
    }
}
