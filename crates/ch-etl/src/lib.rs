//! ch-etl - Ingestion pipeline for County Health Explorer
//!
//! Loads the health indicator CSV and the county GeoJSON into DuckDB, builds
//! the joined view, loads dictionary metadata and validates the join. The
//! stages run in a fixed order as a small state machine; see [`pipeline`].

pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod spatial;
pub mod state;
pub mod tabular;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod validation;
pub mod view;

pub use error::{EtlError, EtlResult};
pub use pipeline::{run_full_etl, EtlPipeline};
pub use state::{EtlOutcome, EtlStage, StageTransition};
pub use validation::{validate_join, ValidationReport};
