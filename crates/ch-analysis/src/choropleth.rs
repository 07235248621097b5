//! Quantile choropleth of one variable over the joined counties.

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::variables::VariableRegistry;
use ch_core::geometry::parse_wkt;
use ch_core::names::JOINED_VIEW;
use ch_core::sql_utils::quote_ident;
use serde::Serialize;
use serde_json::Value;

/// Below this many values the breakpoints are just `[min, max]`.
const MIN_QUANTILE_VALUES: usize = 5;

/// Breakpoint percentiles of the quintile classification.
const QUANTILES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Quantile breakpoints of ascending `sorted` values.
///
/// Breakpoints are deduplicated, so ties at a boundary give fewer classes.
/// A constant series yields `[v, v]`; an empty one yields no breakpoints.
pub fn class_breaks(sorted: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if n < MIN_QUANTILE_VALUES {
        return vec![min, max];
    }

    let mut breaks: Vec<f64> = QUANTILES
        .iter()
        .map(|&p| {
            if p <= 0.0 {
                min
            } else if p >= 1.0 {
                max
            } else {
                let rank = (n as f64 * p).floor() as usize;
                sorted[rank.saturating_sub(1)]
            }
        })
        .collect();
    breaks.sort_by(|a, b| a.total_cmp(b));
    breaks.dedup();

    if breaks.len() == 1 {
        breaks.push(breaks[0]);
    }
    breaks
}

/// 1-based class of `value`: the first interval whose upper bound is at
/// least the value. Values above the last breakpoint land in the last class.
pub fn assign_class(value: f64, breaks: &[f64]) -> usize {
    let classes = breaks.len().saturating_sub(1).max(1);
    breaks
        .iter()
        .skip(1)
        .position(|&upper| value <= upper)
        .map_or(classes, |idx| idx + 1)
}

/// GeoJSON feature collection with classification metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<ChoroplethFeature>,
    pub metadata: ChoroplethMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: FeatureProperties,
    pub geometry: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    pub fips: String,
    pub county_name: Option<String>,
    pub state_name: Option<String>,
    pub value: f64,
    pub class: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethMetadata {
    pub variable: String,
    pub display_name: String,
    pub description: String,
    pub units: String,
    pub data_type: String,
    pub total_features: usize,
    pub class_breaks: Vec<f64>,
    pub value_range: ValueRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

struct ChoroplethRow {
    fips: String,
    county_name: Option<String>,
    state_name: Option<String>,
    value: f64,
    geometry_wkt: String,
}

/// Build the choropleth for `variable`.
///
/// Only counties with a valid value and a readable geometry take part.
/// Breakpoints and the value range cover exactly the returned features.
pub fn choropleth(ctx: &AnalysisContext<'_>, variable: &str) -> AnalysisResult<ChoroplethCollection> {
    let registry = VariableRegistry::load(ctx.db)?;
    let var = registry.resolve(variable)?;
    let storage = ctx.db.geometry_storage();
    let value_column = quote_ident(&var.column);

    let sql = format!(
        "SELECT {fips}, {name}, {state}, {value_column}, {geometry}
FROM {JOINED_VIEW}
WHERE {value_column} IS NOT NULL AND geometry IS NOT NULL
ORDER BY {fips}",
        fips = ctx.fips(),
        name = ctx.county_name(),
        state = ctx.state(),
        geometry = storage.to_wkt("geometry"),
    );
    let result = ctx.db.query_rows(&sql, &[])?;

    let rows: Vec<ChoroplethRow> = result
        .rows
        .iter()
        .filter_map(|row| {
            Some(ChoroplethRow {
                fips: row.first()?.to_text()?,
                county_name: row.get(1).and_then(|v| v.to_text()),
                state_name: row.get(2).and_then(|v| v.to_text()),
                value: row.get(3)?.as_f64()?,
                geometry_wkt: row.get(4)?.to_text()?,
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(AnalysisError::not_found(
            "No valid data found for choropleth",
            format!("Variable '{}' has no numeric values for mapped counties", var.name),
        ));
    }

    let mut mapped = Vec::with_capacity(rows.len());
    for row in rows {
        match parse_wkt(&row.geometry_wkt) {
            Ok(geometry) => mapped.push((row, geometry.to_geojson())),
            Err(e) => log::warn!("Skipping county {} in choropleth: {}", row.fips, e),
        }
    }
    if mapped.is_empty() {
        return Err(AnalysisError::not_found(
            "No valid data found for choropleth",
            format!("Variable '{}' has no mappable counties", var.name),
        ));
    }

    let mut sorted: Vec<f64> = mapped.iter().map(|(row, _)| row.value).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let breaks = class_breaks(&sorted);
    let value_range = ValueRange {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        count: sorted.len(),
    };

    let features: Vec<ChoroplethFeature> = mapped
        .into_iter()
        .map(|(row, geometry)| ChoroplethFeature {
            kind: "Feature",
            properties: FeatureProperties {
                class: assign_class(row.value, &breaks),
                fips: row.fips,
                county_name: row.county_name,
                state_name: row.state_name,
                value: row.value,
            },
            geometry,
        })
        .collect();

    let descriptor = var.descriptor(false);
    log::debug!(
        "Choropleth for {}: {} features, breaks {:?}",
        var.name,
        features.len(),
        breaks
    );

    Ok(ChoroplethCollection {
        kind: "FeatureCollection",
        metadata: ChoroplethMetadata {
            variable: descriptor.variable,
            display_name: descriptor.display_name,
            description: descriptor.description,
            units: descriptor.units,
            data_type: descriptor.data_type,
            total_features: features.len(),
            class_breaks: breaks,
            value_range,
        },
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_breaks_below_five_values() {
        assert_eq!(class_breaks(&[1.0, 2.0, 9.0]), vec![1.0, 9.0]);
        assert_eq!(class_breaks(&[4.0]), vec![4.0, 4.0]);
        assert!(class_breaks(&[]).is_empty());
    }

    #[test]
    fn test_quintile_breaks_nearest_rank() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // ranks floor(10 * p) - 1 -> indices 1, 3, 5, 7
        assert_eq!(class_breaks(&values), vec![1.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_breaks_deduplicated() {
        let values = [1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let breaks = class_breaks(&values);
        assert_eq!(breaks, vec![1.0, 2.0, 4.0, 6.0, 8.0]);
        assert!(breaks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_constant_values_keep_one_class() {
        let breaks = class_breaks(&[5.0; 8]);
        assert_eq!(breaks, vec![5.0, 5.0]);
        assert_eq!(assign_class(5.0, &breaks), 1);
    }

    #[test]
    fn test_assign_class() {
        let breaks = [1.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        assert_eq!(assign_class(1.0, &breaks), 1);
        assert_eq!(assign_class(2.0, &breaks), 1);
        assert_eq!(assign_class(2.5, &breaks), 2);
        assert_eq!(assign_class(8.0, &breaks), 4);
        assert_eq!(assign_class(10.0, &breaks), 5);
        assert_eq!(assign_class(11.0, &breaks), 5);
    }

    #[test]
    fn test_every_class_in_range() {
        let values: Vec<f64> = (0..37).map(|i| ((i * 7) % 11) as f64).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let breaks = class_breaks(&sorted);
        for v in values {
            let class = assign_class(v, &breaks);
            assert!(class >= 1 && class <= breaks.len() - 1, "class {class} for {v}");
        }
    }
}
