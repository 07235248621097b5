//! Summary statistics for one variable.

use crate::context::AnalysisContext;
use crate::error::AnalysisResult;
use crate::round::round_opt;
use crate::variables::VariableRegistry;
use ch_core::catalog::is_percentage_variable;
use ch_core::names::HEALTH_TABLE;
use ch_core::numeric::cast_sql;
use ch_core::sql_utils::quote_ident;
use serde::Serialize;

/// Decimal places of every reported statistic.
const STAT_PLACES: u32 = 2;

/// Scale applied to fraction-valued variables in transform mode.
const PERCENT_SCALE: f64 = 100.0;

/// Raw values, or fractions presented as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsMode {
    Raw,
    Transformed,
}

/// Statistics response. Aggregates over zero valid rows are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableStats {
    pub variable: String,
    pub display_name: String,
    pub description: String,
    pub units: String,
    pub data_type: String,
    /// Only reported in transform mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed: Option<bool>,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

/// SQL computing count, mean, sample std, min, max and median over the
/// coerced values of `column`.
pub fn stats_sql(column: &str) -> String {
    format!(
        "SELECT COUNT(v), AVG(v), STDDEV_SAMP(v), MIN(v), MAX(v), MEDIAN(v)
FROM (SELECT {} AS v FROM {HEALTH_TABLE})
WHERE v IS NOT NULL",
        cast_sql(&quote_ident(column))
    )
}

/// Compute statistics for `variable` over every health record.
pub fn variable_stats(
    ctx: &AnalysisContext<'_>,
    variable: &str,
    mode: StatsMode,
) -> AnalysisResult<VariableStats> {
    let registry = VariableRegistry::load(ctx.db)?;
    let var = registry.resolve(variable)?;

    let rows = ctx.db.query_rows(&stats_sql(&var.column), &[])?;
    let row = rows.first().unwrap_or_default();
    let cell = |idx: usize| row.get(idx).and_then(|v| v.as_f64());

    let count = row
        .first()
        .and_then(|v| v.as_i64())
        .map_or(0, |c| c.max(0) as usize);

    let transformed = mode == StatsMode::Transformed;
    let scale = if transformed && is_percentage_variable(&var.name) {
        PERCENT_SCALE
    } else {
        1.0
    };
    let scaled = |idx: usize| round_opt(cell(idx).map(|v| v * scale), STAT_PLACES);

    let descriptor = var.descriptor(transformed);
    log::debug!(
        "Stats for {} ({} valid values, scale {scale})",
        var.name,
        count
    );

    Ok(VariableStats {
        variable: descriptor.variable,
        display_name: descriptor.display_name,
        description: descriptor.description,
        units: descriptor.units,
        data_type: descriptor.data_type,
        transformed: transformed.then_some(scale != 1.0),
        count,
        mean: scaled(1),
        std: scaled(2),
        min: scaled(3),
        max: scaled(4),
        median: scaled(5),
    })
}
