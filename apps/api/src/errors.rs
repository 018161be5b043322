use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::optimization::errors::OptimizationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Generation service error: {0}")]
    GenerationService(String),

    #[error("Request cancelled: {0}")]
    Cancelled(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<OptimizationError> for AppError {
    fn from(e: OptimizationError) -> Self {
        if e.is_retryable() {
            return AppError::GenerationService(e.to_string());
        }
        match e {
            OptimizationError::InvalidInput(msg) => AppError::Validation(msg),
            OptimizationError::Cancelled { .. } => AppError::Cancelled(e.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::GenerationService(msg) => {
                tracing::error!("Generation service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_SERVICE_ERROR",
                    "The text generation service failed; the request can be retried".to_string(),
                )
            }
            AppError::Cancelled(msg) => {
                tracing::warn!("Cancelled: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CANCELLED",
                    "The request was cancelled because the server is shutting down".to_string(),
                )
            }
            AppError::Timeout(secs) => {
                tracing::warn!("Optimization exceeded {secs}s");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    format!("Optimization did not finish within {secs} seconds"),
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
