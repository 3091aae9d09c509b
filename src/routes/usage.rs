//! Token usage endpoints
//!
//! - `POST /token_usage` - record (upsert) a day's usage for a model
//! - `GET /token_usage` - list every record
//! - `GET /token_usage/{date}/{model}` - single-day lookup
//! - `GET /token_usage/{model}/{period}` - week/month/lifetime sum

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use super::metrics;
use crate::{
    error::{AppError, AppJson, AppResult, ErrorResponse},
    store::StoreError,
    usage::{
        period::{looks_like_date, parse_date},
        DailyUsageResponse, MessageResponse, Period, PeriodUsageResponse, TokenUsageRecord,
        UpsertOutcome, UsageReport,
    },
    AppState,
};

/// Record token usage
///
/// Creates the record for (date, model) or overwrites its token count.
#[utoipa::path(
    post,
    path = "/token_usage",
    tag = "Usage",
    request_body = UsageReport,
    responses(
        (status = 201, description = "Record created", body = MessageResponse),
        (status = 200, description = "Existing record updated", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn record_usage(
    State(state): State<Arc<AppState>>,
    AppJson(report): AppJson<UsageReport>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let start = Instant::now();

    report
        .validate()
        .map_err(|cause| AppError::bad_request("Invalid request payload", cause))?;

    info!(
        date = %report.date,
        model = %report.model,
        total_tokens = report.total_tokens,
        "Received token usage"
    );

    let outcome = state
        .store
        .upsert(report.date, &report.model, report.total_tokens)
        .await
        .map_err(|e| {
            metrics::record_report("failed");
            metrics::record_duration("record", start.elapsed().as_secs_f64());
            AppError::storage("Failed to record token usage")(e)
        })?;

    metrics::record_report(outcome.as_str());
    metrics::record_duration("record", start.elapsed().as_secs_f64());

    info!(
        date = %report.date,
        model = %report.model,
        total_tokens = report.total_tokens,
        outcome = outcome.as_str(),
        "Recorded token usage"
    );

    let response = match outcome {
        UpsertOutcome::Created => (
            StatusCode::CREATED,
            Json(MessageResponse::new("Token usage recorded successfully")),
        ),
        UpsertOutcome::Updated => (
            StatusCode::OK,
            Json(MessageResponse::new("Token usage updated successfully")),
        ),
    };
    Ok(response)
}

/// List all token usage records
#[utoipa::path(
    get,
    path = "/token_usage",
    tag = "Usage",
    responses(
        (status = 200, description = "Every stored record", body = [TokenUsageRecord]),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn list_usage(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<TokenUsageRecord>>> {
    let start = Instant::now();

    let records = state
        .store
        .list_all()
        .await
        .map_err(|e| query_failed("list", start, e))?;

    metrics::record_query("list", "ok");
    metrics::record_duration("list", start.elapsed().as_secs_f64());

    Ok(Json(records))
}

/// Dispatch `/token_usage/{a}/{b}` to a date lookup or a period aggregate
///
/// Both query shapes share one path pattern. A first segment shaped like
/// `YYYY-MM-DD` selects the date lookup; anything else is a model name.
#[utoipa::path(
    get,
    path = "/token_usage/{first}/{second}",
    tag = "Usage",
    params(
        ("first" = String, Path, description = "Calendar date (YYYY-MM-DD) or model name"),
        ("second" = String, Path, description = "Model name after a date, or one of week, month, lifetime")
    ),
    responses(
        (status = 200, description = "Daily lookup result or period sum", body = DailyUsageResponse),
        (status = 400, description = "Invalid date or period", body = ErrorResponse),
        (status = 404, description = "No usage in the period", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
pub async fn get_usage(
    State(state): State<Arc<AppState>>,
    Path((first, second)): Path<(String, String)>,
) -> AppResult<Response> {
    if looks_like_date(&first) {
        usage_by_date(&state, &first, &second)
            .await
            .map(|r| Json(r).into_response())
    } else {
        usage_by_period(&state, &first, &second)
            .await
            .map(|r| Json(r).into_response())
    }
}

/// Look up the token count for one (date, model)
pub async fn usage_by_date(
    state: &AppState,
    date: &str,
    model: &str,
) -> AppResult<DailyUsageResponse> {
    let start = Instant::now();
    let date = parse_date(date).map_err(|e| AppError::bad_request("Invalid date format", e))?;

    let found = state
        .store
        .find(date, model)
        .await
        .map_err(|e| query_failed("lookup", start, e))?;

    metrics::record_duration("lookup", start.elapsed().as_secs_f64());

    Ok(match found {
        Some(total_tokens) => {
            metrics::record_query("lookup", "found");
            DailyUsageResponse::found(total_tokens)
        }
        None => {
            metrics::record_query("lookup", "not_found");
            DailyUsageResponse::not_found()
        }
    })
}

/// Sum a model's tokens over a named period
///
/// A zero sum is reported as not found: no rows and rows summing to zero
/// are indistinguishable to callers.
pub async fn usage_by_period(
    state: &AppState,
    model: &str,
    period: &str,
) -> AppResult<PeriodUsageResponse> {
    let start = Instant::now();
    let period: Period = period.parse()?;
    let range = period.range(state.clock.today());

    let total_tokens = state
        .store
        .sum_tokens(model, range)
        .await
        .map_err(|e| query_failed("period", start, e))?;

    metrics::record_duration("period", start.elapsed().as_secs_f64());

    if total_tokens == 0 {
        metrics::record_query("period", "not_found");
        return Err(AppError::NotFound("No token usage data found for this model"));
    }

    metrics::record_query("period", "found");
    tracing::debug!(
        model = %model,
        period = %period,
        total_tokens = total_tokens,
        "Aggregated token usage"
    );

    Ok(PeriodUsageResponse { total_tokens })
}

/// Count a failed query and wrap its store error
fn query_failed(kind: &str, start: Instant, error: StoreError) -> AppError {
    metrics::record_query(kind, "failed");
    metrics::record_duration(kind, start.elapsed().as_secs_f64());
    AppError::storage("Database query error")(error)
}
