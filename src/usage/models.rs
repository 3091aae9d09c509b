//! Token usage data models
//!
//! Records as persisted, plus the request and response payloads of the
//! `/token_usage` endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum model identifier length (matches the `VARCHAR(255)` column)
pub const MAX_MODEL_LEN: usize = 255;

/// Calendar date format used on the wire and in path segments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One persisted (date, model, total_tokens) tuple
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct TokenUsageRecord {
    /// Store-assigned identity
    #[schema(example = 1)]
    pub id: i32,
    /// Calendar day the usage belongs to
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub date: NaiveDate,
    /// Model identifier
    #[schema(example = "gpt-4")]
    pub model: String,
    /// Latest reported token count for this day and model
    #[schema(example = 150)]
    pub total_tokens: i32,
}

/// Body of `POST /token_usage`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UsageReport {
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub date: NaiveDate,
    #[schema(example = "gpt-4")]
    pub model: String,
    #[schema(example = 100)]
    pub total_tokens: i32,
}

impl UsageReport {
    /// Check constraints serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.model.chars().count() > MAX_MODEL_LEN {
            return Err(format!(
                "model must be at most {} characters",
                MAX_MODEL_LEN
            ));
        }
        Ok(())
    }
}

/// Whether an upsert created a new row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Updated => "updated",
        }
    }
}

/// Plain message response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Presence flag for single-day lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    NotFound,
    Found,
}

impl Serialize for LookupStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            LookupStatus::NotFound => 0,
            LookupStatus::Found => 1,
        })
    }
}

/// Response of `GET /token_usage/{date}/{model}`
///
/// A missing record is still a 200; `status` is 0 and `message` explains why.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyUsageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 150)]
    pub total_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 1 when a record exists, 0 otherwise
    #[schema(value_type = u8, example = 1)]
    pub status: LookupStatus,
}

impl DailyUsageResponse {
    pub fn found(total_tokens: i32) -> Self {
        Self {
            total_tokens: Some(total_tokens),
            message: None,
            status: LookupStatus::Found,
        }
    }

    pub fn not_found() -> Self {
        Self {
            total_tokens: None,
            message: Some("No token usage data found for this date and model".to_string()),
            status: LookupStatus::NotFound,
        }
    }
}

/// Response of `GET /token_usage/{model}/{period}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PeriodUsageResponse {
    #[schema(example = 1250)]
    pub total_tokens: i64,
}
