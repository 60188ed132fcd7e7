//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// API error response body: `{"error": "...", "message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub error: String,
    /// Internal detail, present only outside production-like environments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), message: None }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404)
    NotFound(String),
    /// Invalid request (400)
    BadRequest(String),
    /// Availability conflict (409)
    Conflict(String),
    /// Internal server error (500)
    Internal(String),
}

/// Whether internal error detail may appear in response bodies.
///
/// Mirrors the store-error contract: detail is suppressed unless the
/// deployment explicitly opts into development mode.
fn expose_internal_detail() -> bool {
    std::env::var("APP_ENV").map(|v| v == "development").unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new(msg)),
            AppError::Internal(msg) => {
                let mut body = ErrorBody::new("Internal Server Error");
                if expose_internal_detail() {
                    body.message = Some(msg);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        // One status per error kind; nothing collapses into a generic code.
        match err {
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Conflict(reason) => AppError::Conflict(reason.to_string()),
            ServiceError::Validation(msg) => AppError::BadRequest(msg),
            ServiceError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
