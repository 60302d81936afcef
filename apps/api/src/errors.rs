use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::CompileError;
use crate::relevance::EmbeddingError;

/// Errors raised by the tailoring core (construction, scoring, trimming, rendering).
///
/// Argument and construction errors are raised before the resume is touched, so a
/// failed call never leaves a partially scored or partially trimmed aggregate.
#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Embedding capability unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Missing required field '{field}' at {path}")]
    MissingRequiredField { path: String, field: &'static str },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<EmbeddingError> for TailorError {
    fn from(err: EmbeddingError) -> Self {
        TailorError::EmbeddingUnavailable(err.to_string())
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TailorError> for AppError {
    fn from(err: TailorError) -> Self {
        match err {
            TailorError::InvalidArgument(msg) => AppError::Validation(msg),
            err @ TailorError::MissingRequiredField { .. } => {
                AppError::UnprocessableEntity(err.to_string())
            }
            TailorError::EmbeddingUnavailable(msg) => AppError::Embedding(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Embedding(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "EMBEDDING_UNAVAILABLE",
                    "The embedding service is unavailable".to_string(),
                )
            }
            AppError::Compile(e) => {
                tracing::error!("Compile error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPILE_ERROR",
                    "The document could not be compiled".to_string(),
                )
            }
            AppError::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                format!("Tailoring did not finish within {secs}s"),
            ),
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
