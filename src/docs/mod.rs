//! API Documentation module
//!
//! Provides OpenAPI specification generation for the usage API using utoipa.

mod openapi;

pub use openapi::UsageApiDoc;
