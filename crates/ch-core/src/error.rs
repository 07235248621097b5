//! Error types for ch-core

use thiserror::Error;

/// Core error type for County Health Explorer
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Geometry type other than Polygon/MultiPolygon
    #[error("[C004] Unsupported geometry type: {geometry_type}")]
    UnsupportedGeometry { geometry_type: String },

    /// C005: Malformed coordinates or WKT text
    #[error("[C005] Malformed geometry: {message}")]
    MalformedGeometry { message: String },

    /// C006: IO error with file path context
    #[error("[C006] IO error on {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
