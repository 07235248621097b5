//! ch-analysis - Read-side analytics for County Health Explorer
//!
//! Every operation takes an [`AnalysisContext`] (database handle plus the
//! configured health-table column names), reads the tables built by the ETL
//! pipeline and recomputes its result from scratch. Nothing here writes to
//! the database.

pub mod choropleth;
pub mod context;
pub mod correlation;
pub mod county;
pub mod error;
pub mod moran;
pub mod round;
pub mod stats;
pub mod variables;
pub mod weights;

pub use choropleth::{assign_class, choropleth, class_breaks, ChoroplethCollection};
pub use context::AnalysisContext;
pub use correlation::{correlation, parse_variable_pair, pearson, CorrelationResult};
pub use county::{county_details, county_neighbors, CountyDetails, CountyNeighbors, Neighbor};
pub use error::{AnalysisError, AnalysisResult};
pub use moran::{moran, morans_i, MoranResult, MoranStatistic};
pub use stats::{variable_stats, StatsMode, VariableStats};
pub use variables::{Variable, VariableDescriptor, VariableRegistry};
pub use weights::SpatialWeights;
