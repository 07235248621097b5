//! Errors raised by the county store.

use thiserror::Error;

/// Store errors. Codes are stable and appear in CLI output.
#[derive(Error, Debug)]
pub enum DbError {
    /// The database file could not be opened (D001)
    #[error("[D001] Could not open county database: {0}")]
    Connection(String),

    /// A statement failed (D002)
    #[error("[D002] SQL execution failed: {0}")]
    Execution(String),

    /// A table or view the caller relies on does not exist (D003)
    #[error("[D003] Relation not found: {0}")]
    RelationMissing(String),

    /// `read_csv_auto` rejected an input CSV (D004)
    #[error("[D004] CSV could not be read: {0}")]
    CsvLoad(String),

    /// `spatial: required` but the extension did not load (D005)
    #[error("[D005] Spatial extension unavailable: {0}")]
    SpatialUnavailable(String),

    /// A writer panicked while holding the connection (D006)
    #[error("[D006] Connection lock poisoned: {0}")]
    Poisoned(String),

    /// BEGIN, COMMIT or ROLLBACK failed (D007)
    #[error("[D007] Transaction failed: {0}")]
    Transaction(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb reports catalog misses only through the message text
        let msg = err.to_string();
        let missing = msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("not found"));
        if missing {
            DbError::RelationMissing(msg)
        } else {
            DbError::Execution(msg)
        }
    }
}
