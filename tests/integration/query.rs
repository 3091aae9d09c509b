//! Usage query tests
//!
//! - GET /token_usage
//! - GET /token_usage/{date}/{model}
//! - GET /token_usage/{model}/{period}

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{date, TestHarness};

// =============================================================================
// List all
// =============================================================================

#[tokio::test]
async fn test_list_empty_store() {
    let harness = TestHarness::new();

    let response = harness.server.get("/token_usage").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_returns_every_record() {
    let harness = TestHarness::new();
    harness.report("2024-01-10", "gpt-4", 100).await;
    harness.report("2024-01-11", "claude-3", 200).await;
    harness.report("2024-01-10", "gpt-4", 150).await;

    let response = harness.server.get("/token_usage").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            {"id": 1, "date": "2024-01-10", "model": "gpt-4", "total_tokens": 150},
            {"id": 2, "date": "2024-01-11", "model": "claude-3", "total_tokens": 200}
        ])
    );
}

#[tokio::test]
async fn test_list_storage_failure() {
    let harness = TestHarness::new();
    harness.store.set_failing(true);

    let response = harness.server.get("/token_usage").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["message"], "Database query error");
}

// =============================================================================
// Daily lookup
// =============================================================================

#[tokio::test]
async fn test_lookup_returns_latest_value() {
    let harness = TestHarness::new();
    assert_eq!(harness.report("2024-01-10", "gpt-4", 100).await.0, 201);
    assert_eq!(harness.report("2024-01-10", "gpt-4", 150).await.0, 200);

    let response = harness.server.get("/token_usage/2024-01-10/gpt-4").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({"total_tokens": 150, "status": 1}));
}

#[tokio::test]
async fn test_lookup_missing_record_is_success_with_flag() {
    let harness = TestHarness::new();
    harness.report("2024-01-10", "gpt-4", 100).await;

    let response = harness.server.get("/token_usage/2024-01-11/gpt-4").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "message": "No token usage data found for this date and model",
            "status": 0
        })
    );
}

#[tokio::test]
async fn test_lookup_invalid_date_never_reaches_store() {
    let harness = TestHarness::new();
    // Any storage call would now surface as a 500
    harness.store.set_failing(true);

    let response = harness.server.get("/token_usage/2023-13-40/gpt-4").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid date format");
}

#[tokio::test]
async fn test_lookup_storage_failure() {
    let harness = TestHarness::new();
    harness.store.set_failing(true);

    let response = harness.server.get("/token_usage/2024-01-10/gpt-4").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "connection refused");
}

// =============================================================================
// Period aggregates (today is Wednesday 2024-01-17)
// =============================================================================

async fn seeded_harness() -> TestHarness {
    let harness = TestHarness::new();
    // Previous month
    harness.report("2023-12-30", "gpt-4", 50).await;
    // This month, before this week
    harness.report("2024-01-03", "gpt-4", 100).await;
    // This week
    harness.report("2024-01-14", "gpt-4", 200).await;
    harness.report("2024-01-17", "gpt-4", 25).await;
    // Another model, same week
    harness.report("2024-01-15", "claude-3", 999).await;
    harness
}

async fn period_total(harness: &TestHarness, model: &str, period: &str) -> (StatusCode, Value) {
    let response = harness
        .server
        .get(&format!("/token_usage/{}/{}", model, period))
        .await;
    (response.status_code(), response.json())
}

#[tokio::test]
async fn test_week_excludes_earlier_days_of_month() {
    let harness = seeded_harness().await;

    let (status, body) = period_total(&harness, "gpt-4", "week").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"total_tokens": 225}));
}

#[tokio::test]
async fn test_month_includes_days_outside_week() {
    let harness = seeded_harness().await;

    let (status, body) = period_total(&harness, "gpt-4", "month").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"total_tokens": 325}));
}

#[tokio::test]
async fn test_lifetime_sums_every_record_for_model() {
    let harness = seeded_harness().await;
    // Dates after today still count towards lifetime
    harness.report("2024-02-01", "gpt-4", 5).await;

    let (status, body) = period_total(&harness, "gpt-4", "lifetime").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"total_tokens": 380}));

    let (_, body) = period_total(&harness, "claude-3", "lifetime").await;
    assert_eq!(body, json!({"total_tokens": 999}));
}

#[tokio::test]
async fn test_period_without_rows_is_404() {
    let harness = seeded_harness().await;

    for period in ["week", "month", "lifetime"] {
        let (status, body) = period_total(&harness, "llama-3", period).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "period {}", period);
        assert_eq!(
            body,
            json!({"message": "No token usage data found for this model"})
        );
    }
}

#[tokio::test]
async fn test_zero_sum_is_reported_as_not_found() {
    let harness = TestHarness::new();
    harness.report("2024-01-16", "gpt-4", 0).await;

    let (status, _) = period_total(&harness, "gpt-4", "week").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_period_lists_valid_options() {
    let harness = seeded_harness().await;

    for period in ["year", "day", "WEEK"] {
        let (status, body) = period_total(&harness, "gpt-4", period).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "period {}", period);
        assert_eq!(
            body,
            json!({"message": "Invalid period. Use 'week', 'month' or 'lifetime'"})
        );
    }
}

#[tokio::test]
async fn test_period_storage_failure() {
    let harness = TestHarness::new();
    harness.store.set_failing(true);

    let (status, body) = period_total(&harness, "gpt-4", "month").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database query error");
}

#[tokio::test]
async fn test_week_boundary_on_sunday() {
    // On Sunday the week holds only today
    let harness = TestHarness::at(date(2024, 1, 14));
    harness.report("2024-01-13", "gpt-4", 10).await;
    harness.report("2024-01-14", "gpt-4", 20).await;

    let (_, body) = period_total(&harness, "gpt-4", "week").await;

    assert_eq!(body, json!({"total_tokens": 20}));
}
