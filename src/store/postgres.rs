//! PostgreSQL usage store

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use super::{StoreResult, UsageStore};
use crate::{
    retry::{with_retry, RetryPolicy},
    usage::{DateRange, TokenUsageRecord, UpsertOutcome},
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS token_usage (
        id SERIAL PRIMARY KEY,
        date DATE NOT NULL,
        model VARCHAR(255) NOT NULL,
        total_tokens INTEGER NOT NULL
    )
"#;

// Backs the ON CONFLICT target of the upsert
const CREATE_UNIQUE_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS token_usage_date_model_key
        ON token_usage (date, model)
"#;

pub struct PostgresUsageStore {
    pool: PgPool,
}

impl PostgresUsageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect under the retry policy.
    ///
    /// Each attempt opens a fresh pool and pings it; a pool that fails the
    /// ping is closed before the next attempt. The schema is left untouched;
    /// see [`PostgresUsageStore::ensure_schema`].
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        policy: &RetryPolicy,
    ) -> StoreResult<Self> {
        let pool = with_retry(policy, "database_connect", || async move {
            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(database_url)
                .await?;

            if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
                pool.close().await;
                return Err(e);
            }

            Ok::<_, sqlx::Error>(pool)
        })
        .await?;

        info!("Database connection successful");
        Ok(Self::new(pool))
    }

    /// Idempotent schema creation
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_UNIQUE_INDEX).execute(&self.pool).await?;
        info!("Table token_usage created if not present");
        Ok(())
    }
}

#[async_trait]
impl UsageStore for PostgresUsageStore {
    async fn upsert(
        &self,
        date: NaiveDate,
        model: &str,
        total_tokens: i32,
    ) -> StoreResult<UpsertOutcome> {
        // xmax is 0 only for a freshly inserted tuple
        let row = sqlx::query(
            r#"
            INSERT INTO token_usage (date, model, total_tokens)
            VALUES ($1, $2, $3)
            ON CONFLICT (date, model) DO UPDATE SET total_tokens = EXCLUDED.total_tokens
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(date)
        .bind(model)
        .bind(total_tokens)
        .fetch_one(&self.pool)
        .await?;

        let inserted: bool = row.get("inserted");
        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn list_all(&self) -> StoreResult<Vec<TokenUsageRecord>> {
        let rows = sqlx::query("SELECT id, date, model, total_tokens FROM token_usage")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TokenUsageRecord {
                id: row.get("id"),
                date: row.get("date"),
                model: row.get("model"),
                total_tokens: row.get("total_tokens"),
            })
            .collect())
    }

    async fn find(&self, date: NaiveDate, model: &str) -> StoreResult<Option<i32>> {
        let row = sqlx::query("SELECT total_tokens FROM token_usage WHERE date = $1 AND model = $2")
            .bind(date)
            .bind(model)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("total_tokens")))
    }

    async fn sum_tokens(&self, model: &str, range: DateRange) -> StoreResult<i64> {
        // SUM over INTEGER yields BIGINT
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_tokens), 0) AS total
            FROM token_usage
            WHERE model = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            "#,
        )
        .bind(model)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
