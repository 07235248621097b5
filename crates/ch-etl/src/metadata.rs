//! Variable metadata loading from the data dictionary.

use crate::error::{EtlError, EtlResult};
use ch_core::catalog::{DictionaryRow, VariableCatalog};
use ch_core::names::METADATA_TABLE;
use ch_db::{CsvLoadOptions, Database, QueryRows, SqlValue};
use std::path::Path;

const VARIABLE_NAME_COLUMN: &str = "Variable Name";
const DESCRIPTION_COLUMN: &str = "Description";
const MEASURE_COLUMN: &str = "Measure";

/// Scratch table the dictionary is read into; dropped again after reading.
const DICTIONARY_STAGING_TABLE: &str = "data_dictionary_staging";

fn find_column(result: &QueryRows, name: &str) -> Option<usize> {
    result
        .columns
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case(name))
}

/// Read dictionary rows from a CSV file. A missing file yields no rows.
pub fn read_dictionary(db: &dyn Database, path: &Path) -> EtlResult<Vec<DictionaryRow>> {
    if !path.is_file() {
        log::warn!(
            "Data dictionary not found at {}; variables will use fallback metadata",
            path.display()
        );
        return Ok(Vec::new());
    }

    let display = path.display().to_string();
    db.load_csv(
        DICTIONARY_STAGING_TABLE,
        &path.to_string_lossy(),
        &CsvLoadOptions::all_varchar(),
    )?;
    let result = db.query_rows(&format!("SELECT * FROM {DICTIONARY_STAGING_TABLE}"), &[]);
    db.drop_if_exists(DICTIONARY_STAGING_TABLE)?;
    let result = result?;

    let column = |name: &str| {
        find_column(&result, name).ok_or_else(|| EtlError::InvalidDictionary {
            path: display.clone(),
            message: format!("missing '{name}' column"),
        })
    };
    let name_idx = column(VARIABLE_NAME_COLUMN)?;
    let description_idx = column(DESCRIPTION_COLUMN)?;
    let measure_idx = column(MEASURE_COLUMN)?;

    let text = |row: &[SqlValue], idx: usize| {
        row.get(idx).and_then(SqlValue::to_text).unwrap_or_default()
    };
    Ok(result
        .rows
        .iter()
        .map(|row| DictionaryRow {
            variable_name: text(row, name_idx),
            description: text(row, description_idx),
            measure: text(row, measure_idx),
        })
        .collect())
}

/// Recreate the metadata table from the dictionary at `path` and return the
/// number of entries stored. The table always exists afterwards, possibly
/// empty.
pub fn load_variable_metadata(db: &dyn Database, path: &Path) -> EtlResult<usize> {
    let rows = read_dictionary(db, path)?;
    let catalog = VariableCatalog::from_rows(&rows);

    db.drop_if_exists(METADATA_TABLE)?;
    db.execute_batch(&format!(
        "CREATE TABLE {METADATA_TABLE} (
            variable_code VARCHAR,
            display_name VARCHAR,
            description VARCHAR,
            measure VARCHAR,
            units VARCHAR,
            data_type VARCHAR,
            raw_column_name VARCHAR
        )"
    ))?;

    let params: Vec<Vec<SqlValue>> = catalog
        .iter()
        .map(|info| {
            vec![
                SqlValue::from(info.variable_code.as_str()),
                SqlValue::from(info.display_name.as_str()),
                SqlValue::from(info.description.as_str()),
                SqlValue::from(info.measure.as_str()),
                SqlValue::from(info.units.as_str()),
                SqlValue::from(info.data_type.as_str()),
                SqlValue::from(info.raw_column_name.as_str()),
            ]
        })
        .collect();
    db.insert_rows(
        &format!("INSERT INTO {METADATA_TABLE} VALUES (?, ?, ?, ?, ?, ?, ?)"),
        &params,
    )?;

    log::info!(
        "Loaded {} variable metadata entries from {} dictionary rows",
        catalog.len(),
        rows.len()
    );
    Ok(catalog.len())
}
