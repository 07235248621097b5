//! Global Moran's I over k-nearest-neighbor weights.

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::round::round_to;
use crate::variables::VariableRegistry;
use crate::weights::SpatialWeights;
use ch_core::geometry::parse_wkt;
use ch_core::names::JOINED_VIEW;
use ch_core::sql_utils::quote_ident;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Minimum counties for the normal approximation.
pub const MIN_MORAN_ROWS: usize = 50;

/// Neighbors per county in the weight graph.
pub const KNN_NEIGHBORS: usize = 8;

/// Unrounded statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoranStatistic {
    pub i: f64,
    pub expected_i: f64,
    pub variance: f64,
    pub z_score: f64,
    pub p_value: f64,
}

impl MoranStatistic {
    /// "positive", "negative" or "random" relative to the expectation.
    pub fn interpretation(&self) -> &'static str {
        if self.i > self.expected_i {
            "positive"
        } else if self.i < self.expected_i {
            "negative"
        } else {
            "random"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoranResult {
    pub variable: String,
    pub moran_i: f64,
    pub expected_i: f64,
    pub variance: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub n: usize,
    pub interpretation: String,
}

/// Moran's I of `values` under `weights`, with the normality-assumption
/// variance and a two-sided p-value.
///
/// Returns `None` for fewer than 3 values, zero variance, zero total weight
/// or a non-positive variance estimate.
pub fn morans_i(values: &[f64], weights: &SpatialWeights) -> Option<MoranStatistic> {
    let n = values.len();
    if n < 3 || weights.n() != n {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let z: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let m2: f64 = z.iter().map(|d| d * d).sum();
    let s0 = weights.s0();
    if m2 <= 0.0 || s0 <= 0.0 {
        return None;
    }

    let nf = n as f64;
    let i = (nf / s0) * weights.cross_product(&z, &z) / m2;
    let expected_i = -1.0 / (nf - 1.0);
    let (s1, s2) = (weights.s1(), weights.s2());
    let variance = (nf * nf * s1 - nf * s2 + 3.0 * s0 * s0) / ((nf * nf - 1.0) * s0 * s0)
        - expected_i * expected_i;
    if variance <= 0.0 {
        return None;
    }

    let z_score = (i - expected_i) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).ok()?;
    let p_value = (2.0 * normal.sf(z_score.abs())).min(1.0);

    Some(MoranStatistic {
        i,
        expected_i,
        variance,
        z_score,
        p_value,
    })
}

/// Moran's I for `variable` over joined counties, weights from centroids.
pub fn moran(ctx: &AnalysisContext<'_>, variable: &str) -> AnalysisResult<MoranResult> {
    let registry = VariableRegistry::load(ctx.db)?;
    let var = registry.resolve(variable)?;
    let value_column = quote_ident(&var.column);
    let storage = ctx.db.geometry_storage();

    let sql = format!(
        "SELECT {fips}, {value_column}, {geometry}
FROM {JOINED_VIEW}
WHERE {value_column} IS NOT NULL AND geometry IS NOT NULL
ORDER BY {fips}",
        fips = ctx.fips(),
        geometry = storage.to_wkt("geometry"),
    );
    let rows = ctx.db.query_rows(&sql, &[])?;

    let mut values = Vec::with_capacity(rows.len());
    let mut centroids = Vec::with_capacity(rows.len());
    for row in &rows.rows {
        let fips = row.first().and_then(|v| v.to_text()).unwrap_or_default();
        let (Some(value), Some(wkt)) = (
            row.get(1).and_then(|v| v.as_f64()),
            row.get(2).and_then(|v| v.to_text()),
        ) else {
            continue;
        };
        match parse_wkt(&wkt).map(|g| g.centroid()) {
            Ok(Some(centroid)) => {
                values.push(value);
                centroids.push(centroid);
            }
            Ok(None) => log::warn!("Skipping county {fips} in Moran's I: empty geometry"),
            Err(e) => log::warn!("Skipping county {fips} in Moran's I: {e}"),
        }
    }

    let n = values.len();
    if n < MIN_MORAN_ROWS {
        return Err(AnalysisError::insufficient(
            "Insufficient data for spatial autocorrelation analysis",
            format!(
                "Found {n} counties with values for '{}', need at least {MIN_MORAN_ROWS}",
                var.name
            ),
        ));
    }

    let weights = SpatialWeights::knn(&centroids, KNN_NEIGHBORS).standardized();
    let stat = morans_i(&values, &weights).ok_or_else(|| {
        AnalysisError::insufficient(
            "Insufficient data for spatial autocorrelation analysis",
            format!("Variable '{}' has no variance across counties", var.name),
        )
    })?;
    log::debug!(
        "Moran's I for {}: I={}, z={}, n={n}",
        var.name,
        stat.i,
        stat.z_score
    );

    Ok(MoranResult {
        variable: var.name.clone(),
        moran_i: round_to(stat.i, 4),
        expected_i: round_to(stat.expected_i, 4),
        variance: round_to(stat.variance, 6),
        z_score: round_to(stat.z_score, 4),
        p_value: round_to(stat.p_value, 6),
        n,
        interpretation: stat.interpretation().to_string(),
    })
}

#[cfg(test)]
#[path = "moran_test.rs"]
mod tests;
