//! ch-db - Database abstraction layer for County Health Explorer
//!
//! This crate provides the `Database` trait and its DuckDB implementation.
//! The backend detects the `spatial` extension at open time; without it,
//! geometries are stored as WKT text (see [`GeometryStorage`]).

pub mod duckdb;
pub mod error;
pub mod spatial;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use spatial::GeometryStorage;
pub use traits::{CsvLoadOptions, Database};
pub use value::{QueryRows, SqlValue};
