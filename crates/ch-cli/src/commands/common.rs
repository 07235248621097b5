//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use ch_analysis::AnalysisContext;
use ch_core::Config;
use ch_db::DuckDbBackend;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Non-zero process exit after the command has already reported failure.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load configuration: `--config` when given, else the project directory
/// (defaults when no file exists). `--database` overrides the store path.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(Config, PathBuf)> {
    let project_dir = PathBuf::from(&global.project_dir);
    let mut config = match &global.config {
        Some(path) => {
            Config::load(Path::new(path)).context("Failed to load configuration file")?
        }
        None => Config::load_or_default(&project_dir)
            .context("Failed to load project configuration")?,
    };
    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    Ok((config, project_dir))
}

/// Configured database path resolved against the project directory.
pub(crate) fn database_path(config: &Config, project_dir: &Path) -> PathBuf {
    Config::resolve_path(project_dir, &config.database.path)
}

/// Loaded configuration plus an open store.
pub(crate) struct Session {
    pub config: Config,
    pub project_dir: PathBuf,
    pub db: DuckDbBackend,
}

impl Session {
    /// Open the store for reading. Fails when the database file does not
    /// exist yet.
    pub fn open_existing(global: &GlobalArgs) -> Result<Self> {
        let (config, project_dir) = load_config(global)?;
        let path = database_path(&config, &project_dir);
        if config.database.path != ":memory:" && !path.exists() {
            bail!(
                "Database not found at {}. Run `chx etl` first.",
                path.display()
            );
        }
        Self::open(config, project_dir)
    }

    /// Open the store, creating the database file and its directory when
    /// needed.
    pub fn open_or_create(global: &GlobalArgs) -> Result<Self> {
        let (config, project_dir) = load_config(global)?;
        let path = database_path(&config, &project_dir);
        if config.database.path != ":memory:" {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        Self::open(config, project_dir)
    }

    fn open(config: Config, project_dir: PathBuf) -> Result<Self> {
        let path = database_path(&config, &project_dir);
        let db = DuckDbBackend::open(&path.to_string_lossy(), &config.database)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Self {
            config,
            project_dir,
            db,
        })
    }

    pub fn context(&self) -> AnalysisContext<'_> {
        AnalysisContext::new(&self.db, &self.config.columns)
    }
}

/// Pretty-print a value as JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
