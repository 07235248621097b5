//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::spatial::GeometryStorage;
use crate::traits::{CsvLoadOptions, Database};
use crate::value::{QueryRows, SqlValue};
use ch_core::config::DatabaseConfig;
use ch_core::sql_utils::{quote_ident, string_literal};
use ch_core::SpatialMode;
use duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Mutex;

/// DuckDB database backend
///
/// Holds one root connection. Each operation clones it and works on the
/// clone, which is dropped when the operation returns.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    storage: GeometryStorage,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection without the spatial extension
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            storage: GeometryStorage::Wkt,
        })
    }

    /// Create a new DuckDB connection from a file path without the spatial
    /// extension
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::Connection(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
            storage: GeometryStorage::Wkt,
        })
    }

    /// Open the configured database (handles `:memory:`), apply performance
    /// settings and set up the spatial extension according to
    /// `config.spatial`.
    pub fn open(path: &str, config: &DatabaseConfig) -> DbResult<Self> {
        let mut backend = if path == ":memory:" {
            Self::in_memory()?
        } else {
            Self::from_path(Path::new(path))?
        };

        let native = {
            let conn = backend.root()?;
            apply_settings(&conn, config);
            setup_spatial(&conn, config.spatial)?
        };
        if native {
            backend.storage = GeometryStorage::Native;
        }
        log::info!(
            "Opened DuckDB at {path} (geometry storage: {})",
            backend.storage
        );
        Ok(backend)
    }

    fn root(&self) -> DbResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::Poisoned(e.to_string()))
    }

    /// A fresh connection to the same database for the duration of one
    /// operation.
    fn scoped(&self) -> DbResult<Connection> {
        let root = self.root()?;
        root.try_clone()
            .map_err(|e| DbError::Connection(format!("failed to clone connection: {e}")))
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    fn with_transaction<F, T>(conn: &Connection, body: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::Transaction(format!("BEGIN failed: {e}")))?;

        let result = body(conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(DbError::Transaction(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = conn.execute_batch("ROLLBACK");
            }
        }
        result
    }
}

/// Thread and memory settings are tuning only; failures are logged.
fn apply_settings(conn: &Connection, config: &DatabaseConfig) {
    if let Some(threads) = config.threads {
        if let Err(e) = conn.execute_batch(&format!("SET threads = {threads}")) {
            log::warn!("Failed to set threads = {threads}: {e}");
        }
    }
    if let Some(limit) = &config.memory_limit {
        if let Err(e) = conn.execute_batch(&format!("SET memory_limit = {}", string_literal(limit))) {
            log::warn!("Failed to set memory_limit = {limit}: {e}");
        }
    }
}

/// Load the spatial extension, installing it first when needed.
///
/// Returns whether it is available. Only [`SpatialMode::Required`] turns a
/// failure into an error.
fn setup_spatial(conn: &Connection, mode: SpatialMode) -> DbResult<bool> {
    if mode == SpatialMode::Disabled {
        log::debug!("Spatial extension disabled by configuration");
        return Ok(false);
    }
    if conn.execute_batch("LOAD spatial;").is_ok() {
        return Ok(true);
    }
    match conn.execute_batch("INSTALL spatial; LOAD spatial;") {
        Ok(()) => Ok(true),
        Err(e) if mode == SpatialMode::Required => Err(DbError::SpatialUnavailable(e.to_string())),
        Err(e) => {
            log::warn!("Spatial extension unavailable, storing geometries as WKT text: {e}");
            Ok(false)
        }
    }
}

fn read_csv_sql(path: &str, options: &CsvLoadOptions) -> String {
    let mut args = vec![string_literal(path), "header = true".to_string()];
    if options.all_varchar {
        args.push("all_varchar = true".to_string());
    } else if !options.text_columns.is_empty() {
        let types: Vec<String> = options
            .text_columns
            .iter()
            .map(|c| format!("{}: 'VARCHAR'", string_literal(c)))
            .collect();
        args.push(format!("types = {{{}}}", types.join(", ")));
    }
    format!("SELECT * FROM read_csv_auto({})", args.join(", "))
}

impl Database for DuckDbBackend {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.scoped()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    fn create_view_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()> {
        let sql = if replace {
            format!("CREATE OR REPLACE VIEW {} AS {}", name, select)
        } else {
            format!("CREATE VIEW {} AS {}", name, select)
        };
        self.execute_batch(&sql)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };
        let conn = self.scoped()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            [schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.scoped()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn csv_columns(&self, path: &str) -> DbResult<Vec<String>> {
        let sql = format!("DESCRIBE {}", read_csv_sql(path, &CsvLoadOptions::default()));
        let result = self
            .query_rows(&sql, &[])
            .map_err(|e| DbError::CsvLoad(format!("{path}: {e}")))?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().and_then(|v| v.to_text()))
            .collect())
    }

    fn load_csv(&self, table: &str, path: &str, options: &CsvLoadOptions) -> DbResult<usize> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS {}",
            table,
            read_csv_sql(path, options)
        );
        let conn = self.scoped()?;
        conn.execute_batch(&sql)
            .map_err(|e| DbError::CsvLoad(format!("{path}: {e}")))?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // the relation may be either kind; dropping the wrong kind errors
        let _ = self.execute_batch(&format!("DROP VIEW IF EXISTS {}", name));
        let _ = self.execute_batch(&format!("DROP TABLE IF EXISTS {}", name));
        Ok(())
    }

    fn describe(&self, relation: &str) -> DbResult<Vec<(String, String)>> {
        let result = self.query_rows(&format!("DESCRIBE {}", quote_ident(relation)), &[])?;
        Ok(result
            .rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let name = cells.next().and_then(|v| v.to_text()).unwrap_or_default();
                let ty = cells.next().and_then(|v| v.to_text()).unwrap_or_default();
                (name, ty)
            })
            .collect())
    }

    fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<QueryRows> {
        let conn = self.scoped()?;
        let mut stmt = conn.prepare(sql)?;

        // column metadata is only valid once the statement has executed
        let rows: Vec<Vec<SqlValue>> = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| SqlValue::from_row(row, i))
                    .collect())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let columns = (0..stmt.column_count())
            .map(|i| stmt.column_name(i).map_or("?".to_string(), |v| v.to_string()))
            .collect();

        Ok(QueryRows { columns, rows })
    }

    fn insert_rows(&self, sql: &str, rows: &[Vec<SqlValue>]) -> DbResult<usize> {
        let conn = self.scoped()?;
        Self::with_transaction(&conn, |conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut affected = 0;
            for row in rows {
                affected += stmt.execute(params_from_iter(row.iter()))?;
            }
            Ok(affected)
        })
    }

    fn geometry_storage(&self) -> GeometryStorage {
        self.storage
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
