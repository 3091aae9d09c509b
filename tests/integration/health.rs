//! Health endpoint integration tests
//!
//! - GET /health - Full health check with database status
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestHarness;

#[tokio::test]
async fn test_health_endpoint_returns_proper_structure() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json.get("uptime_seconds").is_some(), "Response should have 'uptime_seconds' field");
    assert!(json.get("timestamp").is_some(), "Response should have 'timestamp' field");

    let database = &json["checks"]["database"];
    assert_eq!(database["status"], "healthy");
    assert!(database.get("latency_ms").is_some());
    assert!(database.get("error").is_none());
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let harness = TestHarness::new();
    harness.store.set_failing(true);

    let response = harness.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["database"]["error"], "connection refused");
}

#[tokio::test]
async fn test_readiness_follows_database() {
    let harness = TestHarness::new();

    harness.server.get("/health/ready").await.assert_status_ok();

    harness.store.set_failing(true);
    let response = harness.server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_liveness_ignores_database() {
    let harness = TestHarness::new();
    harness.store.set_failing(true);

    let response = harness.server.get("/health/live").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let harness = TestHarness::new();

    let response = harness.server.get("/docs/openapi.json").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert!(json["paths"].get("/token_usage").is_some());
}
