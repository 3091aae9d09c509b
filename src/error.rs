//! Error types for the token usage service
//!
//! Every handler error is logged and rendered as a JSON body of the form
//! `{"message": ..., "error": ...}`.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;
use crate::usage::period::InvalidPeriod;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}: {cause}")]
    BadRequest {
        message: &'static str,
        cause: String,
    },

    #[error("{0}")]
    InvalidPeriod(#[from] InvalidPeriod),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn bad_request(message: &'static str, cause: impl ToString) -> Self {
        AppError::BadRequest {
            message,
            cause: cause.to_string(),
        }
    }

    /// Wrap a store failure with what was being attempted
    pub fn storage(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AppError::Storage { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Underlying cause, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::BadRequest { message, cause } => {
                tracing::warn!(error = %cause, "{}", message);
                ErrorResponse {
                    message: message.to_string(),
                    error: Some(cause.clone()),
                }
            }
            AppError::InvalidPeriod(e) => {
                tracing::warn!("{}", e);
                ErrorResponse {
                    message: e.to_string(),
                    error: None,
                }
            }
            AppError::NotFound(message) => {
                tracing::debug!("{}", message);
                ErrorResponse {
                    message: message.to_string(),
                    error: None,
                }
            }
            AppError::Storage { context, source } => {
                tracing::error!(error = %source, "{}", context);
                ErrorResponse {
                    message: context.to_string(),
                    error: Some(source.to_string()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections render as [`AppError`]
///
/// The body is decoded regardless of `Content-Type`; only an unreadable or
/// unparseable body is rejected.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request("Invalid request payload", e.body_text()))?;

        serde_json::from_slice(&body)
            .map(AppJson)
            .map_err(|e| AppError::bad_request("Invalid request payload", e))
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
