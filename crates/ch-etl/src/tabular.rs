//! Health indicator CSV loading.

use crate::error::{require_file, EtlResult};
use ch_core::config::ColumnConfig;
use ch_core::names::{is_raw_value_column, HEALTH_TABLE};
use ch_db::{CsvLoadOptions, Database};
use std::path::Path;

/// Replace the health table with the contents of `csv_path` and return the
/// number of rows loaded.
///
/// Column types are sniffed, except the identifier column and the raw-value
/// columns. Those stay `VARCHAR` so leading zeros and the source text of
/// each measurement reach numeric coercion unchanged.
pub fn load_health_records(
    db: &dyn Database,
    csv_path: &Path,
    columns: &ColumnConfig,
) -> EtlResult<usize> {
    require_file(csv_path)?;
    log::info!("Loading county health data from {}", csv_path.display());

    let path = csv_path.to_string_lossy();
    let options = db
        .csv_columns(&path)?
        .into_iter()
        .filter(|column| is_raw_value_column(column))
        .fold(
            CsvLoadOptions::default().with_text_column(columns.fips.as_str()),
            |options, column| options.with_text_column(column),
        );
    let count = db.load_csv(HEALTH_TABLE, &path, &options)?;

    log::info!("Loaded {count} rows of county health data");
    Ok(count)
}

/// Raw-value columns of the health table in table order.
pub fn raw_value_columns(db: &dyn Database) -> EtlResult<Vec<String>> {
    Ok(db
        .describe(HEALTH_TABLE)?
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| is_raw_value_column(name))
        .collect())
}
