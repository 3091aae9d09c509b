//! Token usage domain
//!
//! Records, request/response payloads and aggregation periods.

pub mod models;
pub mod period;

pub use models::{
    DailyUsageResponse, MessageResponse, PeriodUsageResponse, TokenUsageRecord, UpsertOutcome,
    UsageReport,
};
pub use period::{Clock, DateRange, FixedClock, Period, SystemClock};
