//! Usage storage
//!
//! The [`UsageStore`] trait is the seam between handlers and persistence.
//! [`PostgresUsageStore`] backs the running service; [`InMemoryUsageStore`]
//! stands in for it in tests.

#[cfg(any(test, feature = "test-utils"))]
pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::usage::{DateRange, TokenUsageRecord, UpsertOutcome};

#[cfg(any(test, feature = "test-utils"))]
pub use self::in_memory::InMemoryUsageStore;
pub use self::postgres::PostgresUsageStore;

/// Storage-level errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Insert or overwrite the record for (date, model), atomically.
    async fn upsert(
        &self,
        date: NaiveDate,
        model: &str,
        total_tokens: i32,
    ) -> StoreResult<UpsertOutcome>;

    /// Every record, in storage order.
    async fn list_all(&self) -> StoreResult<Vec<TokenUsageRecord>>;

    /// Token count recorded for an exact (date, model) pair.
    async fn find(&self, date: NaiveDate, model: &str) -> StoreResult<Option<i32>>;

    /// Sum of token counts for a model within the range; 0 when nothing matches.
    async fn sum_tokens(&self, model: &str, range: DateRange) -> StoreResult<i64>;

    /// Connectivity check.
    async fn ping(&self) -> StoreResult<()>;

    /// Release underlying connections.
    async fn close(&self) {}
}
