//! CLI command implementations

pub(crate) mod common;
pub(crate) mod etl;
pub(crate) mod query;
pub(crate) mod serve;
pub(crate) mod validate;
