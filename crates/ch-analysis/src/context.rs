//! Shared inputs of the read operations.

use ch_core::config::ColumnConfig;
use ch_core::sql_utils::quote_ident;
use ch_db::Database;

/// Database handle plus health-table column names.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub db: &'a dyn Database,
    pub columns: &'a ColumnConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(db: &'a dyn Database, columns: &'a ColumnConfig) -> Self {
        Self { db, columns }
    }

    /// Quoted identifier column.
    pub(crate) fn fips(&self) -> String {
        quote_ident(&self.columns.fips)
    }

    /// Quoted county name column.
    pub(crate) fn county_name(&self) -> String {
        quote_ident(&self.columns.county_name)
    }

    /// Quoted state column.
    pub(crate) fn state(&self) -> String {
        quote_ident(&self.columns.state)
    }
}
