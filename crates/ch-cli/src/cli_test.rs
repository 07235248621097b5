use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["chx", "stats", "--var", "adult_obesity", "-v", "-d", "x.duckdb"])
        .unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.database.as_deref(), Some("x.duckdb"));
    assert_eq!(cli.global.project_dir, ".");
    match cli.command {
        Commands::Stats(args) => {
            assert_eq!(args.var, "adult_obesity");
            assert!(!args.transformed);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_positional_fips() {
    let cli = Cli::try_parse_from(["chx", "neighbors", "01003"]).unwrap();
    match cli.command {
        Commands::Neighbors(args) => assert_eq!(args.fips, "01003"),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_stats_requires_var() {
    assert!(Cli::try_parse_from(["chx", "stats"]).is_err());
}

#[test]
fn test_serve_overrides() {
    let cli = Cli::try_parse_from(["chx", "serve", "--port", "9000"]).unwrap();
    match cli.command {
        Commands::Serve(args) => {
            assert_eq!(args.port, Some(9000));
            assert_eq!(args.host, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
}
