//! Etl command implementation

use anyhow::Result;
use ch_core::Config;
use ch_etl::{EtlOutcome, EtlPipeline};

use crate::cli::{EtlArgs, GlobalArgs};
use crate::commands::common::{print_json, ExitCode, Session};

/// Execute the etl command
pub(crate) fn execute(args: &EtlArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_or_create(global)?;
    let root = &session.project_dir;
    let data = &session.config.data;
    let health_csv = args
        .health_csv
        .clone()
        .unwrap_or_else(|| Config::resolve_path(root, &data.health_csv));
    let counties_geojson = args
        .counties_geojson
        .clone()
        .unwrap_or_else(|| Config::resolve_path(root, &data.counties_geojson));

    let outcome = EtlPipeline::new(&session.db, &session.config, root)
        .with_inputs(health_csv, counties_geojson)
        .run();

    if args.json {
        print_json(&outcome)?;
    } else {
        print_summary(&outcome);
    }

    if outcome.success {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_summary(outcome: &EtlOutcome) {
    let count = |value: Option<usize>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    if outcome.success {
        println!("ETL run {} completed", outcome.run_id);
    } else {
        println!(
            "ETL run {} failed during {}: {}",
            outcome.run_id,
            outcome
                .failed_stage
                .map_or_else(|| "unknown stage".to_string(), |s| s.to_string()),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!("  health records:     {}", count(outcome.health_rows_loaded));
    println!("  spatial records:    {}", count(outcome.spatial_rows_loaded));
    println!("  metadata entries:   {}", count(outcome.metadata_entries_loaded));

    if let Some(report) = &outcome.validation {
        println!(
            "  joined records:     {} ({:.1}%)",
            report.joined_records, report.join_success_rate
        );
        println!("  missing geometries: {}", report.missing_geometries);
        println!("  duplicate FIPS:     {}", report.duplicate_fips);
    }
    if let Some(finished) = outcome.finished_at {
        let elapsed = finished - outcome.started_at;
        println!("  elapsed:            {}ms", elapsed.num_milliseconds());
    }
}
