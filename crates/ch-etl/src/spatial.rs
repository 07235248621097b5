//! County GeoJSON loading.
//!
//! Features are translated to WKT one by one. A feature is kept only when it
//! has an identifier and a translatable Polygon/MultiPolygon; everything
//! else is skipped with a warning.

use crate::error::{require_file, EtlError, EtlResult};
use ch_core::config::GeoJsonConfig;
use ch_core::geojson_to_wkt;
use ch_core::names::SPATIAL_TABLE;
use ch_db::{Database, SqlValue};
use serde_json::Value;
use std::path::Path;

/// One county geometry ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialRecord {
    pub fips_code: String,
    pub county_name: String,
    pub state_fp: String,
    pub wkt: String,
}

/// Text of a feature property. Numbers are stringified; anything else
/// (missing, null, nested) is empty.
fn property_text(properties: &Value, key: &str) -> String {
    match properties.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Extract insertable records from a parsed FeatureCollection.
///
/// Returns an error message when the document has no `features` array.
pub fn collect_records(
    document: &Value,
    properties: &GeoJsonConfig,
) -> Result<Vec<SpatialRecord>, String> {
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| "expected a FeatureCollection with a 'features' array".to_string())?;
    log::info!("Found {} features in GeoJSON", features.len());

    let mut records = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let props = feature.get("properties").unwrap_or(&Value::Null);
        let fips_code = property_text(props, &properties.id_property);
        if fips_code.is_empty() {
            log::warn!("Skipping feature {idx}: no '{}' property", properties.id_property);
            continue;
        }

        let geometry = feature.get("geometry").unwrap_or(&Value::Null);
        let wkt = match geojson_to_wkt(geometry) {
            Ok(wkt) => wkt,
            Err(e) => {
                log::warn!("Skipping feature {fips_code}: {e}");
                continue;
            }
        };

        records.push(SpatialRecord {
            county_name: property_text(props, &properties.name_property),
            state_fp: property_text(props, &properties.state_property),
            fips_code,
            wkt,
        });
    }
    Ok(records)
}

/// Replace the spatial table with the features of `geojson_path` and return
/// the number of geometries stored.
pub fn load_county_geometries(
    db: &dyn Database,
    geojson_path: &Path,
    properties: &GeoJsonConfig,
) -> EtlResult<usize> {
    require_file(geojson_path)?;
    log::info!("Loading spatial data from {}", geojson_path.display());

    let path = geojson_path.display().to_string();
    let text = std::fs::read_to_string(geojson_path).map_err(|source| EtlError::Io {
        path: path.clone(),
        source,
    })?;
    let document: Value = serde_json::from_str(&text).map_err(|e| EtlError::InvalidGeoJson {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let records = collect_records(&document, properties)
        .map_err(|message| EtlError::InvalidGeoJson { path, message })?;

    let storage = db.geometry_storage();
    db.drop_if_exists(SPATIAL_TABLE)?;
    db.execute_batch(&format!(
        "CREATE TABLE {SPATIAL_TABLE} (
            fips_code VARCHAR,
            county_name VARCHAR,
            state_fp VARCHAR,
            geometry {}
        )",
        storage.column_type()
    ))?;

    let rows: Vec<Vec<SqlValue>> = records
        .into_iter()
        .map(|r| {
            vec![
                SqlValue::Text(r.fips_code),
                SqlValue::Text(r.county_name),
                SqlValue::Text(r.state_fp),
                SqlValue::Text(r.wkt),
            ]
        })
        .collect();
    db.insert_rows(
        &format!(
            "INSERT INTO {SPATIAL_TABLE} (fips_code, county_name, state_fp, geometry) VALUES (?, ?, ?, {})",
            storage.from_wkt("?")
        ),
        &rows,
    )?;

    if let Some(sql) = storage.rtree_index_sql("idx_county_spatial_geom", SPATIAL_TABLE, "geometry") {
        db.execute_batch(&sql)?;
    }
    db.execute_batch(&format!(
        "CREATE INDEX idx_county_spatial_fips ON {SPATIAL_TABLE} (fips_code)"
    ))?;

    log::info!("Loaded {} spatial records (geometry storage: {storage})", rows.len());
    Ok(rows.len())
}
