//! Single-county lookups: details and adjacent counties.

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use ch_core::geometry::{parse_wkt, Geometry};
use ch_core::names::{
    is_raw_value_column, FipsCode, VariableName, HEALTH_TABLE, JOINED_VIEW, SPATIAL_TABLE,
};
use ch_db::SqlValue;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyDetails {
    pub fips: String,
    pub county_name: Option<String>,
    pub state: Option<String>,
    /// Variable name to raw text, `None` for an empty cell.
    pub health_indicators: BTreeMap<String, Option<String>>,
    /// GeoJSON geometry when the county has one.
    pub geometry: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub fips: String,
    pub county_name: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyNeighbors {
    pub target_fips: String,
    pub neighbors: Vec<Neighbor>,
    pub count: usize,
}

fn validate_fips(fips: &str) -> AnalysisResult<FipsCode> {
    let code = FipsCode::new(fips);
    if code.is_well_formed() {
        Ok(code)
    } else {
        Err(AnalysisError::validation(
            "Invalid FIPS code",
            "FIPS code must be exactly 5 digits",
        ))
    }
}

fn county_not_found(fips: &FipsCode) -> AnalysisError {
    AnalysisError::not_found(
        "County not found",
        format!("FIPS code '{fips}' not found in dataset"),
    )
}

/// Fails with NotFound unless the county has both health data and a
/// geometry.
fn require_joined(ctx: &AnalysisContext<'_>, code: &FipsCode) -> AnalysisResult<()> {
    let exists = ctx.db.query_rows(
        &format!("SELECT 1 FROM {JOINED_VIEW} WHERE {} = ? LIMIT 1", ctx.fips()),
        &[SqlValue::from(code.as_str())],
    )?;
    if exists.is_empty() {
        Err(county_not_found(code))
    } else {
        Ok(())
    }
}

/// Every health indicator of one joined county plus its geometry.
///
/// Indicators are read from the health table so they keep their source text.
pub fn county_details(ctx: &AnalysisContext<'_>, fips: &str) -> AnalysisResult<CountyDetails> {
    let code = validate_fips(fips)?;
    require_joined(ctx, &code)?;

    let rows = ctx.db.query_rows(
        &format!("SELECT * FROM {HEALTH_TABLE} WHERE {} = ? LIMIT 1", ctx.fips()),
        &[SqlValue::from(code.as_str())],
    )?;
    let Some(row) = rows.first() else {
        return Err(county_not_found(&code));
    };

    let column_text = |name: &str| {
        rows.column_index(name)
            .and_then(|idx| row.get(idx))
            .and_then(SqlValue::to_text)
    };

    let health_indicators = rows
        .columns
        .iter()
        .zip(row)
        .filter(|(column, _)| is_raw_value_column(column))
        .map(|(column, value)| {
            let text = value.to_text().filter(|t| !t.trim().is_empty());
            (VariableName::from_column(column).into_inner(), text)
        })
        .collect();

    let storage = ctx.db.geometry_storage();
    let geometry_rows = ctx.db.query_rows(
        &format!(
            "SELECT {} FROM {SPATIAL_TABLE} WHERE fips_code = ? AND geometry IS NOT NULL LIMIT 1",
            storage.to_wkt("geometry")
        ),
        &[SqlValue::from(code.as_str())],
    )?;
    let geometry = match geometry_rows
        .first()
        .and_then(|r| r.first())
        .and_then(SqlValue::to_text)
    {
        Some(wkt) => match parse_wkt(&wkt) {
            Ok(g) => Some(g.to_geojson()),
            Err(e) => {
                log::warn!("County {code} has an unreadable geometry: {e}");
                None
            }
        },
        None => None,
    };

    Ok(CountyDetails {
        county_name: column_text(&ctx.columns.county_name),
        state: column_text(&ctx.columns.state),
        fips: code.into_inner(),
        health_indicators,
        geometry,
    })
}

/// Counties sharing a boundary with `fips`, ordered by name.
///
/// Uses `ST_Touches` when geometries are stored natively; otherwise two
/// counties are adjacent when they share at least one boundary vertex.
pub fn county_neighbors(ctx: &AnalysisContext<'_>, fips: &str) -> AnalysisResult<CountyNeighbors> {
    let code = validate_fips(fips)?;
    require_joined(ctx, &code)?;

    let neighbors = if ctx.db.geometry_storage().is_native() {
        touching_counties(ctx, &code)?
    } else {
        vertex_sharing_counties(ctx, &code)?
    };
    log::debug!("County {code} has {} neighbors", neighbors.len());

    Ok(CountyNeighbors {
        target_fips: code.into_inner(),
        count: neighbors.len(),
        neighbors,
    })
}

fn neighbor_from_row(row: &[SqlValue]) -> Option<Neighbor> {
    Some(Neighbor {
        fips: row.first()?.to_text()?,
        county_name: row.get(1).and_then(SqlValue::to_text),
        state: row.get(2).and_then(SqlValue::to_text),
    })
}

fn touching_counties(ctx: &AnalysisContext<'_>, code: &FipsCode) -> AnalysisResult<Vec<Neighbor>> {
    let sql = format!(
        "SELECT c.{fips}, c.{name}, c.{state}
FROM {JOINED_VIEW} c, (SELECT geometry FROM {JOINED_VIEW} WHERE {fips} = ?) t
WHERE c.{fips} <> ? AND ST_Touches(c.geometry, t.geometry)
ORDER BY c.{name}, c.{fips}",
        fips = ctx.fips(),
        name = ctx.county_name(),
        state = ctx.state(),
    );
    let params = [SqlValue::from(code.as_str()), SqlValue::from(code.as_str())];
    let rows = ctx.db.query_rows(&sql, &params)?;
    Ok(rows.rows.iter().filter_map(|r| neighbor_from_row(r)).collect())
}

fn vertex_sharing_counties(
    ctx: &AnalysisContext<'_>,
    code: &FipsCode,
) -> AnalysisResult<Vec<Neighbor>> {
    let sql = format!(
        "SELECT {fips}, {name}, {state}, geometry FROM {JOINED_VIEW} ORDER BY {name}, {fips}",
        fips = ctx.fips(),
        name = ctx.county_name(),
        state = ctx.state(),
    );
    let rows = ctx.db.query_rows(&sql, &[])?;

    let mut parsed: Vec<(Neighbor, Geometry)> = Vec::with_capacity(rows.len());
    for row in &rows.rows {
        let Some(neighbor) = neighbor_from_row(row) else {
            continue;
        };
        let Some(wkt) = row.get(3).and_then(SqlValue::to_text) else {
            continue;
        };
        match parse_wkt(&wkt) {
            Ok(geometry) => parsed.push((neighbor, geometry)),
            Err(e) => log::warn!("Skipping county {} in adjacency: {e}", neighbor.fips),
        }
    }

    let Some(target) = parsed
        .iter()
        .find(|(n, _)| n.fips == code.as_str())
        .map(|(_, g)| g.clone())
    else {
        return Ok(Vec::new());
    };

    Ok(parsed
        .into_iter()
        .filter(|(n, g)| n.fips != code.as_str() && g.shares_vertex_with(&target))
        .map(|(n, _)| n)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fips() {
        assert!(validate_fips("01001").is_ok());
        for bad in ["1001", "010011", "0100a", ""] {
            let err = validate_fips(bad).unwrap_err();
            assert_eq!(err.details(), "FIPS code must be exactly 5 digits");
        }
    }

    #[test]
    fn test_not_found_details() {
        let err = county_not_found(&FipsCode::new("99999"));
        assert_eq!(err.message(), "County not found");
        assert_eq!(err.details(), "FIPS code '99999' not found in dataset");
    }
}
