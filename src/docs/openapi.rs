//! OpenAPI specification for the usage API

use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    usage::{
        DailyUsageResponse, MessageResponse, PeriodUsageResponse, TokenUsageRecord, UsageReport,
    },
};

/// OpenAPI specification for the token usage service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Token Usage API",
        version = "1.0.0",
        description = "Record and aggregate per-day, per-model token usage"
    ),
    paths(
        crate::routes::usage::record_usage,
        crate::routes::usage::list_usage,
        crate::routes::usage::get_usage
    ),
    components(
        schemas(
            TokenUsageRecord,
            UsageReport,
            MessageResponse,
            DailyUsageResponse,
            PeriodUsageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Usage", description = "Token usage recording and aggregation")
    )
)]
pub struct UsageApiDoc;
