//! Database trait definition

use crate::error::DbResult;
use crate::spatial::GeometryStorage;
use crate::value::{QueryRows, SqlValue};

/// Options for bulk CSV loads.
#[derive(Debug, Clone, Default)]
pub struct CsvLoadOptions {
    /// Columns forced to `VARCHAR` instead of the sniffed type.
    pub text_columns: Vec<String>,
    /// Read every column as `VARCHAR`.
    pub all_varchar: bool,
}

impl CsvLoadOptions {
    /// Keep `column` as text (identifier columns with leading zeros).
    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_columns.push(column.into());
        self
    }

    /// Read every column as text (dictionary files).
    pub fn all_varchar() -> Self {
        Self {
            text_columns: Vec::new(),
            all_varchar: true,
        }
    }
}

/// Database abstraction shared by the ETL pipeline and the read paths.
///
/// Every call runs on its own short-lived connection, so implementations
/// must be `Send + Sync` and safe to call from many threads at once.
pub trait Database: Send + Sync {
    /// Execute multiple SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Create view from SELECT statement
    fn create_view_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()>;

    /// Check if a table or view exists
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Row count of a query
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Header column names of a CSV file, in file order
    fn csv_columns(&self, path: &str) -> DbResult<Vec<String>>;

    /// Load a CSV file into `table` (replacing it) and return its row count
    fn load_csv(&self, table: &str, path: &str, options: &CsvLoadOptions) -> DbResult<usize>;

    /// Drop a table or view if it exists
    fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// `(column_name, column_type)` pairs of a relation in declaration order
    fn describe(&self, relation: &str) -> DbResult<Vec<(String, String)>>;

    /// Run a query with positional `?` parameters and collect every row
    fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<QueryRows>;

    /// Execute a prepared statement once per parameter row inside a single
    /// transaction; returns total affected rows
    fn insert_rows(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize>;

    /// How geometries are stored on this connection
    fn geometry_storage(&self) -> GeometryStorage;
}
