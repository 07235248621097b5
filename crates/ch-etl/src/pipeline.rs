//! ETL orchestration.
//!
//! ```text
//! Idle -> LoadingTabular -> LoadingSpatial -> BuildingView
//!      -> LoadingMetadata -> Validating -> Done
//! ```
//!
//! Any stage error moves the run to `Failed`. Tables created by earlier
//! stages are left in place.

use crate::error::EtlResult;
use crate::metadata::load_variable_metadata;
use crate::spatial::load_county_geometries;
use crate::state::{EtlOutcome, EtlStage};
use crate::tabular::load_health_records;
use crate::validation::validate_join;
use crate::view::build_joined_view;
use ch_core::Config;
use ch_db::Database;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One configured ETL run against a database.
pub struct EtlPipeline<'a> {
    db: &'a dyn Database,
    config: &'a Config,
    health_csv: PathBuf,
    counties_geojson: PathBuf,
}

impl<'a> EtlPipeline<'a> {
    /// Input paths are resolved against `project_root`.
    pub fn new(db: &'a dyn Database, config: &'a Config, project_root: &Path) -> Self {
        Self {
            db,
            config,
            health_csv: Config::resolve_path(project_root, &config.data.health_csv),
            counties_geojson: Config::resolve_path(project_root, &config.data.counties_geojson),
        }
    }

    /// Override the resolved input paths.
    pub fn with_inputs(mut self, health_csv: PathBuf, counties_geojson: PathBuf) -> Self {
        self.health_csv = health_csv;
        self.counties_geojson = counties_geojson;
        self
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.config.data.dictionary_path(&self.health_csv)
    }

    /// Run every stage. Never fails; errors are recorded in the outcome.
    pub fn run(&self) -> EtlOutcome {
        let run_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let mut outcome = EtlOutcome::new(run_id);
        log::info!("Starting ETL run {}", outcome.run_id);

        match self.run_stages(&mut outcome) {
            Ok(()) => {
                outcome.advance(EtlStage::Done);
                log::info!("ETL run {} completed successfully", outcome.run_id);
            }
            Err(e) => {
                log::error!(
                    "ETL run {} failed during {}: {e}",
                    outcome.run_id,
                    outcome.stage
                );
                outcome.fail(e.to_string());
            }
        }
        outcome
    }

    fn run_stages(&self, outcome: &mut EtlOutcome) -> EtlResult<()> {
        let fips_column = self.config.columns.fips.as_str();

        outcome.advance(EtlStage::LoadingTabular);
        outcome.health_rows_loaded = Some(load_health_records(
            self.db,
            &self.health_csv,
            &self.config.columns,
        )?);

        outcome.advance(EtlStage::LoadingSpatial);
        outcome.spatial_rows_loaded = Some(load_county_geometries(
            self.db,
            &self.counties_geojson,
            &self.config.geojson,
        )?);

        outcome.advance(EtlStage::BuildingView);
        build_joined_view(self.db, fips_column)?;

        outcome.advance(EtlStage::LoadingMetadata);
        outcome.metadata_entries_loaded =
            Some(load_variable_metadata(self.db, &self.dictionary_path())?);

        outcome.advance(EtlStage::Validating);
        let report = validate_join(self.db, fips_column)?;
        for warning in report.warnings(&self.config.validation) {
            log::warn!("{warning}");
        }
        outcome.validation = Some(report);
        Ok(())
    }
}

/// Run the full pipeline with the configured inputs.
pub fn run_full_etl(db: &dyn Database, config: &Config, project_root: &Path) -> EtlOutcome {
    EtlPipeline::new(db, config, project_root).run()
}
