//! OpenAPI document endpoint

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::docs::UsageApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(UsageApiDoc::openapi())
}

/// Create the docs router
///
/// Routes:
/// - GET /docs/openapi.json - Raw OpenAPI spec
///
/// Generic over state so it can be merged into the `Arc<AppState>` router.
pub fn create_docs_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/docs/openapi.json", get(openapi_json))
}
