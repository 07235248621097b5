//! Error types for ch-analysis

use ch_db::DbError;
use thiserror::Error;

/// Errors returned by the read operations.
///
/// `Validation` and `InsufficientData` are caller-correctable, `NotFound`
/// means the requested entity has no data, and `Internal` is unexpected.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A001: Bad, missing or malformed input
    #[error("[A001] {message}: {details}")]
    Validation { message: String, details: String },

    /// A002: No matching entity or no data for it
    #[error("[A002] {message}: {details}")]
    NotFound { message: String, details: String },

    /// A003: Statistical precondition not met
    #[error("[A003] {message}: {details}")]
    InsufficientData { message: String, details: String },

    /// A004: Database failure
    #[error("[A004] {0}")]
    Internal(#[from] DbError),
}

/// Result type alias for AnalysisError
pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        AnalysisError::Validation {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn not_found(message: impl Into<String>, details: impl Into<String>) -> Self {
        AnalysisError::NotFound {
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn insufficient(message: impl Into<String>, details: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            message: message.into(),
            details: details.into(),
        }
    }

    /// Short headline without the error code.
    pub fn message(&self) -> String {
        match self {
            AnalysisError::Validation { message, .. }
            | AnalysisError::NotFound { message, .. }
            | AnalysisError::InsufficientData { message, .. } => message.clone(),
            AnalysisError::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    /// Caller-facing details. Internal failures are not described.
    pub fn details(&self) -> String {
        match self {
            AnalysisError::Validation { details, .. }
            | AnalysisError::NotFound { details, .. }
            | AnalysisError::InsufficientData { details, .. } => details.clone(),
            AnalysisError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }
}
