use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Generation-pipeline failures carry their diagnostic payload here but the wire
/// response only ever shows a generic message; raw model output is logged server-side.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient context: no knowledge documents retrieved")]
    InsufficientContext,

    #[error("Model returned empty output")]
    EmptyGeneration,

    #[error("Model returned unparsable output: {0}")]
    MalformedResponse(String),

    #[error("Rate limit exceeded after {retries} attempts")]
    RateLimitExceeded { retries: u32 },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InsufficientContext => {
                tracing::error!("Generation aborted: no context documents retrieved");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INSUFFICIENT_CONTEXT",
                    "Could not produce a recommendation. Please try again.".to_string(),
                )
            }
            AppError::EmptyGeneration => {
                tracing::error!("Generation failed: model returned empty output");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMPTY_GENERATION",
                    "Could not produce a recommendation. Please try again.".to_string(),
                )
            }
            AppError::MalformedResponse(raw) => {
                tracing::error!("Generation failed: unparsable model output: {raw}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_RESPONSE",
                    "Could not produce a recommendation. Please try again.".to_string(),
                )
            }
            AppError::RateLimitExceeded { retries } => {
                tracing::error!("Upstream rate limit exhausted after {retries} attempts");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RATE_LIMIT_EXCEEDED",
                    "The service is busy. Please try again shortly.".to_string(),
                )
            }
            AppError::ExternalService(msg) => {
                tracing::error!("External service error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTERNAL_SERVICE_ERROR",
                    "An upstream service error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
