//! Joined county view.

use crate::error::EtlResult;
use crate::tabular::raw_value_columns;
use ch_core::names::{HEALTH_TABLE, JOINED_VIEW, SPATIAL_TABLE};
use ch_core::numeric;
use ch_core::sql_utils::{qualified, quote_ident};
use ch_db::Database;

/// SELECT body of the joined view.
///
/// Raw-value columns are replaced by their coerced `DOUBLE` form; every other
/// health column passes through. Only rows with a geometry are kept.
pub fn joined_view_sql(fips_column: &str, raw_columns: &[String]) -> String {
    let mut select = Vec::with_capacity(raw_columns.len() + 4);
    if raw_columns.is_empty() {
        select.push("h.*".to_string());
    } else {
        let excluded: Vec<String> = raw_columns.iter().map(|c| quote_ident(c)).collect();
        select.push(format!("h.* EXCLUDE ({})", excluded.join(", ")));
        for column in raw_columns {
            select.push(format!(
                "{} AS {}",
                numeric::cast_sql(&qualified("h", column)),
                quote_ident(column)
            ));
        }
    }
    select.push("s.county_name AS spatial_county_name".to_string());
    select.push("s.state_fp".to_string());
    select.push("s.geometry".to_string());

    format!(
        "SELECT {}\nFROM {HEALTH_TABLE} h\nINNER JOIN {SPATIAL_TABLE} s ON {} = s.fips_code\nWHERE s.geometry IS NOT NULL",
        select.join(",\n       "),
        qualified("h", fips_column),
    )
}

/// Create or replace the joined view. Returns the raw-value columns it
/// exposes.
pub fn build_joined_view(db: &dyn Database, fips_column: &str) -> EtlResult<Vec<String>> {
    let raw_columns = raw_value_columns(db)?;
    db.create_view_as(JOINED_VIEW, &joined_view_sql(fips_column, &raw_columns), true)?;
    log::info!(
        "Created {JOINED_VIEW} view with {} raw-value columns",
        raw_columns.len()
    );
    Ok(raw_columns)
}
