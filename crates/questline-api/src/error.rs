//! Questline API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use questline_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection, pool, or migration error.
    #[error("database error: {0}")]
    Database(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Tracing or OpenTelemetry pipeline setup failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        Self::Database(err.to_string())
    }
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
            DomainError::EmptyQueue(_) => (StatusCode::BAD_REQUEST, "no_pending_quests"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::BAD_REQUEST, "concurrency_conflict")
            }
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        // Storage detail stays in the logs.
        let message = if let DomainError::Infrastructure(detail) = &self.0 {
            error!(detail = %detail, "request failed on infrastructure error");
            "internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
