//! ch-core - Core library for County Health Explorer
//!
//! This crate provides the configuration model, the strict numeric coercion
//! shared by every analytical query, the GeoJSON/WKT geometry translator and
//! the data-dictionary variable catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod names;
mod newtype_string;
pub mod numeric;
pub mod sql_utils;

pub use catalog::{DictionaryRow, HealthDomain, VariableCatalog, VariableInfo};
pub use config::{Config, SpatialMode};
pub use error::{CoreError, CoreResult};
pub use geometry::{geojson_to_wkt, parse_wkt, Geometry};
pub use names::{FipsCode, VariableName};
