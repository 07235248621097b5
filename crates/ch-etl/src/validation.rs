//! Join completeness report.

use crate::error::EtlResult;
use ch_core::config::ValidationConfig;
use ch_core::names::{HEALTH_TABLE, JOINED_VIEW, SPATIAL_TABLE};
use ch_core::sql_utils::qualified;
use ch_db::Database;
use serde::{Deserialize, Serialize};

/// Counts describing how well health records joined to geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub health_records: usize,
    pub spatial_records: usize,
    pub joined_records: usize,
    pub missing_geometries: usize,
    pub duplicate_fips: usize,
    /// `joined_records / health_records * 100`, 0 without health records.
    pub join_success_rate: f64,
}

impl ValidationReport {
    pub fn from_counts(
        health_records: usize,
        spatial_records: usize,
        joined_records: usize,
        missing_geometries: usize,
        duplicate_fips: usize,
    ) -> Self {
        let join_success_rate = if health_records > 0 {
            joined_records as f64 / health_records as f64 * 100.0
        } else {
            0.0
        };
        Self {
            health_records,
            spatial_records,
            joined_records,
            missing_geometries,
            duplicate_fips,
            join_success_rate,
        }
    }

    /// Threshold violations worth a warning. None of them fail a run.
    pub fn warnings(&self, thresholds: &ValidationConfig) -> Vec<String> {
        let mut warnings = Vec::new();
        let expected = thresholds.expected_counties as f64;
        if (self.health_records as f64) < expected * thresholds.min_count_ratio {
            warnings.push(format!(
                "Health records ({}) below expected (~{})",
                self.health_records, thresholds.expected_counties
            ));
        }
        if self.missing_geometries as f64 > self.health_records as f64 * thresholds.max_missing_ratio {
            warnings.push(format!(
                "High number of missing geometries: {}",
                self.missing_geometries
            ));
        }
        if self.duplicate_fips > 0 {
            warnings.push(format!("Duplicate FIPS codes: {}", self.duplicate_fips));
        }
        warnings
    }
}

/// Compute the report from the current tables.
pub fn validate_join(db: &dyn Database, fips_column: &str) -> EtlResult<ValidationReport> {
    let health_fips = qualified("h", fips_column);

    let health_records = db.query_count(&format!("SELECT * FROM {HEALTH_TABLE}"))?;
    let spatial_records = db.query_count(&format!("SELECT * FROM {SPATIAL_TABLE}"))?;
    let joined_records = db.query_count(&format!("SELECT * FROM {JOINED_VIEW}"))?;
    let missing_geometries = db.query_count(&format!(
        "SELECT * FROM {HEALTH_TABLE} h
         LEFT JOIN {SPATIAL_TABLE} s ON {health_fips} = s.fips_code AND s.geometry IS NOT NULL
         WHERE s.fips_code IS NULL"
    ))?;
    let distinct_fips = db.query_count(&format!(
        "SELECT DISTINCT {health_fips} FROM {HEALTH_TABLE} h WHERE {health_fips} IS NOT NULL"
    ))?;
    let non_null_fips = db.query_count(&format!(
        "SELECT * FROM {HEALTH_TABLE} h WHERE {health_fips} IS NOT NULL"
    ))?;

    let report = ValidationReport::from_counts(
        health_records,
        spatial_records,
        joined_records,
        missing_geometries,
        non_null_fips - distinct_fips,
    );
    log::info!(
        "Validation: {} health, {} spatial, {} joined, {} missing geometries, {} duplicate FIPS ({:.1}% joined)",
        report.health_records,
        report.spatial_records,
        report.joined_records,
        report.missing_geometries,
        report.duplicate_fips,
        report.join_success_rate
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_success_rate() {
        let report = ValidationReport::from_counts(5, 5, 5, 0, 0);
        assert_eq!(report.join_success_rate, 100.0);
        let partial = ValidationReport::from_counts(4, 3, 3, 1, 0);
        assert_eq!(partial.join_success_rate, 75.0);
        assert_eq!(ValidationReport::from_counts(0, 3, 0, 0, 0).join_success_rate, 0.0);
    }

    #[test]
    fn test_warnings_use_thresholds() {
        let thresholds = ValidationConfig::default();
        let full = ValidationReport::from_counts(3142, 3142, 3142, 0, 0);
        assert!(full.warnings(&thresholds).is_empty());

        let sparse = ValidationReport::from_counts(100, 80, 80, 20, 2);
        let warnings = sparse.warnings(&thresholds);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("below expected"));
        assert!(warnings[1].contains("missing geometries"));
    }
}
