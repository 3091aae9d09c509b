//! Token usage service
//!
//! Records per-day, per-model token counts in PostgreSQL and answers
//! single-day and period-aggregate queries over HTTP.

pub mod config;
pub mod docs;
pub mod error;
pub mod retry;
pub mod routes;
pub mod store;
pub mod usage;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

pub use crate::config::Config;
#[cfg(any(test, feature = "test-utils"))]
pub use crate::store::InMemoryUsageStore;
pub use crate::store::{PostgresUsageStore, UsageStore};
pub use crate::usage::{Clock, FixedClock, SystemClock};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn UsageStore>,
    /// Source of "today" for week/month boundaries
    pub clock: Arc<dyn Clock>,
    pub start_time: Instant,
}

impl AppState {
    /// Connect to PostgreSQL (with startup retries), ensure the schema and
    /// build the state
    pub async fn new(config: Config) -> Result<Self> {
        let store = PostgresUsageStore::connect(
            &config.database_url,
            config.database_max_connections,
            &config.connect_retry_policy(),
        )
        .await
        .context("Failed to connect to the database after multiple retries")?;

        if let Err(e) = store.ensure_schema().await {
            store.close().await;
            return Err(e).context("Failed to create the token_usage table");
        }

        Ok(Self::from_parts(config, Arc::new(store), Arc::new(SystemClock)))
    }

    /// Create application state for testing around any store and clock
    ///
    /// Lets handlers run against [`InMemoryUsageStore`] and a fixed date.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        config: Config,
        store: Arc<dyn UsageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_parts(config, store, clock)
    }

    fn from_parts(config: Config, store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
            start_time: Instant::now(),
        }
    }
}
