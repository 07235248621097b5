//! County Health Explorer CLI - ETL runner, analytics commands and HTTP API

use clap::Parser;

mod api;
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{etl, serve, validate};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Etl(args) => etl::execute(args, &cli.global),
        Commands::Validate(args) => validate::execute(args, &cli.global),
        Commands::Vars(args) => commands::query::vars(args, &cli.global),
        Commands::Stats(args) => commands::query::stats(args, &cli.global),
        Commands::Choropleth(args) => commands::query::choropleth(args, &cli.global),
        Commands::Corr(args) => commands::query::corr(args, &cli.global),
        Commands::Moran(args) => commands::query::moran(args, &cli.global),
        Commands::County(args) => commands::query::county(args, &cli.global),
        Commands::Neighbors(args) => commands::query::neighbors(args, &cli.global),
        Commands::Serve(args) => serve::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code),
            None => {
                eprintln!("Error: {err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
