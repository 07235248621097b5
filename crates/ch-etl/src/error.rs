//! Error types for ch-etl

use ch_db::DbError;
use thiserror::Error;

/// Ingestion errors. Any of these aborts the running pipeline.
#[derive(Error, Debug)]
pub enum EtlError {
    /// E001: Input file does not exist
    #[error("[E001] Input file not found: {path}")]
    MissingInput { path: String },

    /// E002: Input file could not be read
    #[error("[E002] Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// E003: GeoJSON document is not a feature collection
    #[error("[E003] Invalid GeoJSON in {path}: {message}")]
    InvalidGeoJson { path: String, message: String },

    /// E004: Data dictionary lacks the expected columns
    #[error("[E004] Invalid data dictionary {path}: {message}")]
    InvalidDictionary { path: String, message: String },

    /// E005: Database failure during a stage
    #[error("[E005] {0}")]
    Database(#[from] DbError),
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;

/// Fail with [`EtlError::MissingInput`] unless `path` is an existing file.
pub(crate) fn require_file(path: &std::path::Path) -> EtlResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(EtlError::MissingInput {
            path: path.display().to_string(),
        })
    }
}
