//! Validate command implementation

use anyhow::{Context, Result};
use ch_etl::{validate_join, ValidationReport};
use serde::Serialize;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{print_json, ExitCode, Session};

/// Join report plus threshold warnings.
#[derive(Debug, Serialize)]
pub(crate) struct ValidationOutput {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub warnings: Vec<String>,
}

/// Execute the validate command
pub(crate) fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let report = validate_join(&session.db, &session.config.columns.fips)
        .context("Failed to compute validation report")?;
    let warnings = report.warnings(&session.config.validation);
    for warning in &warnings {
        log::warn!("{warning}");
    }
    let strict_failure = args.strict && !warnings.is_empty();

    print_json(&ValidationOutput { report, warnings })?;

    if strict_failure {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
