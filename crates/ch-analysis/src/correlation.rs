//! Pearson correlation between two variables.

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::round::round_to;
use crate::variables::VariableRegistry;
use ch_core::names::JOINED_VIEW;
use ch_core::sql_utils::quote_ident;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Minimum number of paired observations.
pub const MIN_CORRELATION_PAIRS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub var1: String,
    pub var2: String,
    /// Coefficient rounded to 3 places.
    pub correlation: f64,
    /// Two-sided p-value rounded to 6 places.
    pub p_value: f64,
    pub n: usize,
}

/// Split a comma-separated pair of variable names.
pub fn parse_variable_pair(vars: &str) -> AnalysisResult<(String, String)> {
    let names: Vec<&str> = vars.split(',').map(str::trim).collect();
    match names.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(AnalysisError::validation(
            "Exactly two variables required, separated by comma",
            format!("Received '{vars}'"),
        )),
    }
}

/// Pearson coefficient and two-sided p-value of paired samples.
///
/// Returns `None` with fewer than 3 pairs, mismatched lengths, or zero
/// variance in either series. The coefficient is clamped to `[-1, 1]`.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len();
    if n < 3 || n != y.len() {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    let p = if r.abs() >= 1.0 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        (2.0 * dist.sf(t.abs())).min(1.0)
    };
    Some((r, p))
}

/// Correlate two variables over the joined counties.
pub fn correlation(
    ctx: &AnalysisContext<'_>,
    var1: &str,
    var2: &str,
) -> AnalysisResult<CorrelationResult> {
    let registry = VariableRegistry::load(ctx.db)?;
    let first = registry.resolve(var1)?;
    let second = registry.resolve(var2)?;
    let (a, b) = (quote_ident(&first.column), quote_ident(&second.column));

    let sql = format!(
        "SELECT {a}, {b} FROM {JOINED_VIEW}
WHERE {a} IS NOT NULL AND {b} IS NOT NULL AND geometry IS NOT NULL
ORDER BY {}",
        ctx.fips()
    );
    let rows = ctx.db.query_rows(&sql, &[])?;
    let (x, y): (Vec<f64>, Vec<f64>) = rows
        .rows
        .iter()
        .filter_map(|row| Some((row.first()?.as_f64()?, row.get(1)?.as_f64()?)))
        .unzip();

    let n = x.len();
    if n < MIN_CORRELATION_PAIRS {
        return Err(AnalysisError::insufficient(
            "Insufficient valid data for correlation",
            format!(
                "Found {n} paired values for '{}' and '{}', need at least {MIN_CORRELATION_PAIRS}",
                first.name, second.name
            ),
        ));
    }

    let (r, p) = pearson(&x, &y).ok_or_else(|| {
        AnalysisError::insufficient(
            "Insufficient valid data for correlation",
            format!(
                "Correlation is undefined: '{}' or '{}' has no variance",
                first.name, second.name
            ),
        )
    })?;
    log::debug!("Correlation {} ~ {}: r={r}, p={p}, n={n}", first.name, second.name);

    Ok(CorrelationResult {
        var1: first.name.clone(),
        var2: second.name.clone(),
        correlation: round_to(r, 3),
        p_value: round_to(p, 6),
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable_pair() {
        assert_eq!(
            parse_variable_pair(" adult_obesity , adult_smoking ").unwrap(),
            ("adult_obesity".to_string(), "adult_smoking".to_string())
        );
        for bad in ["adult_obesity", "a,b,c", "a,", ""] {
            let err = parse_variable_pair(bad).unwrap_err();
            assert_eq!(err.message(), "Exactly two variables required, separated by comma");
        }
    }

    #[test]
    fn test_perfect_correlation() {
        let x: Vec<f64> = (0..12).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        let (r, p) = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(p, 0.0);

        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        let (r, _) = pearson(&x, &neg).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_coefficient_and_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let (r, p) = pearson(&x, &y).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
        // t = 0.8 * sqrt(3 / 0.36) = 2.3094, two-sided p with 3 df
        assert!((p - 0.1041).abs() < 1e-3, "p = {p}");
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let x = [1.0; 12];
        let y: Vec<f64> = (0..12).map(f64::from).collect();
        assert!(pearson(&x, &y).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_coefficient_bounded() {
        let x = [0.1, 0.2, 0.30000000000000004, 0.4, 0.5];
        let (r, p) = pearson(&x, &x).unwrap();
        assert!(r <= 1.0 && r >= -1.0);
        assert!((0.0..=1.0).contains(&p));
    }
}
