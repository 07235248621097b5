//! Error responses of the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ch_analysis::AnalysisError;
use serde_json::json;

const INTERNAL_ERROR: &str = "Internal Server Error";
const INTERNAL_DETAILS: &str = "An unexpected error occurred";

/// An error rendered as `{ "error", "status", "details" }`.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: details.into(),
        }
    }

    pub fn bad_request(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, details)
    }

    /// 500 with generic details; `context` is only logged.
    pub fn internal(context: impl std::fmt::Display) -> Self {
        log::error!("Internal error: {context}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, INTERNAL_DETAILS)
    }

    /// Error for a missing required query parameter.
    pub fn missing_param(name: &str) -> Self {
        Self::bad_request(
            "Missing required parameter",
            format!("Query parameter '{name}' is required"),
        )
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let status = match &err {
            AnalysisError::Validation { .. } | AnalysisError::InsufficientData { .. } => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::NotFound { .. } => StatusCode::NOT_FOUND,
            AnalysisError::Internal(_) => return Self::internal(&err),
        };
        Self::new(status, err.message(), err.details())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "status": self.status.as_u16(),
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}
