//! Read commands: each prints one JSON document to stdout.

use anyhow::{Context, Result};
use ch_analysis::{
    choropleth as build_choropleth, correlation, county_details, county_neighbors,
    moran as morans_i, parse_variable_pair, variable_stats, StatsMode, VariableRegistry,
};
use serde_json::json;

use crate::cli::{
    ChoroplethArgs, CorrArgs, CountyArgs, GlobalArgs, MoranArgs, StatsArgs, VarsArgs,
};
use crate::commands::common::{print_json, Session};

/// Execute the vars command
pub(crate) fn vars(args: &VarsArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let registry = VariableRegistry::load(&session.db).context("Failed to list variables")?;
    if args.categories {
        print_json(&registry.by_domain())
    } else {
        print_json(&json!({
            "variables": registry.variables(),
            "count": registry.len(),
        }))
    }
}

/// Execute the stats command
pub(crate) fn stats(args: &StatsArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let mode = if args.transformed {
        StatsMode::Transformed
    } else {
        StatsMode::Raw
    };
    let stats = variable_stats(&session.context(), &args.var, mode)?;
    print_json(&stats)
}

/// Execute the choropleth command
pub(crate) fn choropleth(args: &ChoroplethArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let collection = build_choropleth(&session.context(), &args.var)?;
    match &args.output {
        Some(path) => {
            let text = serde_json::to_string(&collection).context("Failed to serialize GeoJSON")?;
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} features to {}",
                collection.metadata.total_features,
                path.display()
            );
            Ok(())
        }
        None => print_json(&collection),
    }
}

/// Execute the corr command
pub(crate) fn corr(args: &CorrArgs, global: &GlobalArgs) -> Result<()> {
    let (var1, var2) = parse_variable_pair(&args.vars)?;
    let session = Session::open_existing(global)?;
    let result = correlation(&session.context(), &var1, &var2)?;
    print_json(&result)
}

/// Execute the moran command
pub(crate) fn moran(args: &MoranArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let result = morans_i(&session.context(), &args.var)?;
    print_json(&result)
}

/// Execute the county command
pub(crate) fn county(args: &CountyArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let details = county_details(&session.context(), &args.fips)?;
    print_json(&details)
}

/// Execute the neighbors command
pub(crate) fn neighbors(args: &CountyArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open_existing(global)?;
    let result = county_neighbors(&session.context(), &args.fips)?;
    print_json(&result)
}
