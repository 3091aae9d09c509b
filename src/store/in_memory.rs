//! In-memory usage store for testing
//!
//! Keeps records in insertion order behind an `RwLock`, with the same
//! upsert semantics as the PostgreSQL store. Can be switched into a failing
//! mode to exercise storage error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{StoreError, StoreResult, UsageStore};
use crate::usage::{DateRange, TokenUsageRecord, UpsertOutcome};

#[derive(Default)]
struct Inner {
    records: Vec<TokenUsageRecord>,
    next_id: i32,
}

#[derive(Default)]
pub struct InMemoryUsageStore {
    inner: RwLock<Inner>,
    failing: AtomicBool,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("store lock poisoned".to_string())
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn upsert(
        &self,
        date: NaiveDate,
        model: &str,
        total_tokens: i32,
    ) -> StoreResult<UpsertOutcome> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        if let Some(existing) = inner
            .records
            .iter_mut()
            .find(|r| r.date == date && r.model == model)
        {
            existing.total_tokens = total_tokens;
            return Ok(UpsertOutcome::Updated);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.push(TokenUsageRecord {
            id,
            date,
            model: model.to_string(),
            total_tokens,
        });
        Ok(UpsertOutcome::Created)
    }

    async fn list_all(&self) -> StoreResult<Vec<TokenUsageRecord>> {
        self.check_available()?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.records.clone())
    }

    async fn find(&self, date: NaiveDate, model: &str) -> StoreResult<Option<i32>> {
        self.check_available()?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner
            .records
            .iter()
            .find(|r| r.date == date && r.model == model)
            .map(|r| r.total_tokens))
    }

    async fn sum_tokens(&self, model: &str, range: DateRange) -> StoreResult<i64> {
        self.check_available()?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.model == model && range.contains(r.date))
            .map(|r| i64::from(r.total_tokens))
            .sum())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
