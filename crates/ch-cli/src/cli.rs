//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// County Health Explorer - load county health data and query it
#[derive(Parser, Debug)]
#[command(name = "chx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path
    #[arg(short, long, global = true, env = "CHX_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load health records, county geometries and the data dictionary
    Etl(EtlArgs),

    /// Report how well health records joined to geometries
    Validate(ValidateArgs),

    /// List available variables
    Vars(VarsArgs),

    /// Summary statistics for one variable
    Stats(StatsArgs),

    /// Quantile-classified GeoJSON for one variable
    Choropleth(ChoroplethArgs),

    /// Pearson correlation between two variables
    Corr(CorrArgs),

    /// Global Moran's I for one variable
    Moran(MoranArgs),

    /// Health indicators and geometry of one county
    County(CountyArgs),

    /// Counties sharing a boundary with one county
    Neighbors(CountyArgs),

    /// Serve the read API over HTTP
    Serve(ServeArgs),
}

/// Arguments for the etl command
#[derive(Args, Debug)]
pub struct EtlArgs {
    /// Override the health CSV path
    #[arg(long)]
    pub health_csv: Option<PathBuf>,

    /// Override the county GeoJSON path
    #[arg(long)]
    pub counties_geojson: Option<PathBuf>,

    /// Print the run outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Exit non-zero when any threshold warning is raised
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the vars command
#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Group variables by health domain
    #[arg(long)]
    pub categories: bool,
}

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Variable name, e.g. adult_obesity
    #[arg(long)]
    pub var: String,

    /// Present fraction-valued variables as percentages
    #[arg(long)]
    pub transformed: bool,
}

/// Arguments for the choropleth command
#[derive(Args, Debug)]
pub struct ChoroplethArgs {
    /// Variable name
    #[arg(long)]
    pub var: String,

    /// Write the GeoJSON to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the corr command
#[derive(Args, Debug)]
pub struct CorrArgs {
    /// Two variable names separated by a comma
    #[arg(long)]
    pub vars: String,
}

/// Arguments for the moran command
#[derive(Args, Debug)]
pub struct MoranArgs {
    /// Variable name
    #[arg(long)]
    pub var: String,
}

/// Arguments for the county and neighbors commands
#[derive(Args, Debug)]
pub struct CountyArgs {
    /// 5-digit FIPS code
    pub fips: String,
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (default from config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (default from config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
