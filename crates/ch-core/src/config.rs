//! Configuration types and parsing for countyhealth.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names tried by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["countyhealth.yml", "countyhealth.yaml"];

/// Project configuration from countyhealth.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,

    /// DuckDB store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Input file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Column names in the health CSV
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Property keys in the county GeoJSON
    #[serde(default)]
    pub geojson: GeoJsonConfig,

    /// Post-load validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// HTTP read API settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            database: DatabaseConfig::default(),
            data: DataConfig::default(),
            columns: ColumnConfig::default(),
            geojson: GeoJsonConfig::default(),
            validation: ValidationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// How the store treats DuckDB's spatial extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpatialMode {
    /// Load it when available, otherwise store geometries as WKT text
    #[default]
    Auto,
    /// Fail to open the store without it
    Required,
    /// Never load it
    Disabled,
}

impl std::fmt::Display for SpatialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpatialMode::Auto => write!(f, "auto"),
            SpatialMode::Required => write!(f, "required"),
            SpatialMode::Disabled => write!(f, "disabled"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Spatial extension handling
    #[serde(default)]
    pub spatial: SpatialMode,

    /// `SET threads`; unset leaves the DuckDB default
    #[serde(default = "default_threads")]
    pub threads: Option<u32>,

    /// `SET memory_limit`, e.g. "4GB"
    #[serde(default = "default_memory_limit")]
    pub memory_limit: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            spatial: SpatialMode::default(),
            threads: default_threads(),
            memory_limit: default_memory_limit(),
        }
    }
}

/// Input files for the ETL pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// County health indicators (CSV)
    #[serde(default = "default_health_csv")]
    pub health_csv: String,

    /// County boundaries (GeoJSON FeatureCollection)
    #[serde(default = "default_counties_geojson")]
    pub counties_geojson: String,

    /// Data dictionary file name, resolved next to `health_csv`
    #[serde(default = "default_dictionary_file")]
    pub dictionary_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            health_csv: default_health_csv(),
            counties_geojson: default_counties_geojson(),
            dictionary_file: default_dictionary_file(),
        }
    }
}

impl DataConfig {
    /// Dictionary path: same directory as the health CSV.
    pub fn dictionary_path(&self, health_csv: &Path) -> PathBuf {
        health_csv
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.dictionary_file)
    }
}

/// Health CSV column names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_fips_column")]
    pub fips: String,

    #[serde(default = "default_county_name_column")]
    pub county_name: String,

    #[serde(default = "default_state_column")]
    pub state: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            fips: default_fips_column(),
            county_name: default_county_name_column(),
            state: default_state_column(),
        }
    }
}

/// GeoJSON feature property keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonConfig {
    #[serde(default = "default_id_property")]
    pub id_property: String,

    #[serde(default = "default_name_property")]
    pub name_property: String,

    #[serde(default = "default_state_property")]
    pub state_property: String,
}

impl Default for GeoJsonConfig {
    fn default() -> Self {
        Self {
            id_property: default_id_property(),
            name_property: default_name_property(),
            state_property: default_state_property(),
        }
    }
}

/// Thresholds that trigger validation warnings (never failures)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Expected number of US counties
    #[serde(default = "default_expected_counties")]
    pub expected_counties: u64,

    /// Warn when health records < expected_counties * min_count_ratio
    #[serde(default = "default_min_count_ratio")]
    pub min_count_ratio: f64,

    /// Warn when missing geometries > health records * max_missing_ratio
    #[serde(default = "default_max_missing_ratio")]
    pub max_missing_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            expected_counties: default_expected_counties(),
            min_count_ratio: default_min_count_ratio(),
            max_missing_ratio: default_max_missing_ratio(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Attach a permissive CORS layer
    #[serde(default = "default_true")]
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allow_any: true,
        }
    }
}

fn default_name() -> String {
    "county-health".to_string()
}

fn default_db_path() -> String {
    "data/county_health.duckdb".to_string()
}

fn default_threads() -> Option<u32> {
    Some(4)
}

fn default_memory_limit() -> Option<String> {
    Some("4GB".to_string())
}

fn default_health_csv() -> String {
    "data/analytic_data.csv".to_string()
}

fn default_counties_geojson() -> String {
    "data/counties.json".to_string()
}

fn default_dictionary_file() -> String {
    "data_dictionary.csv".to_string()
}

fn default_fips_column() -> String {
    "5-digit FIPS Code".to_string()
}

fn default_county_name_column() -> String {
    "Name".to_string()
}

fn default_state_column() -> String {
    "State Abbreviation".to_string()
}

fn default_id_property() -> String {
    "GEOID".to_string()
}

fn default_name_property() -> String {
    "NAME".to_string()
}

fn default_state_property() -> String {
    "STATEFP".to_string()
}

fn default_expected_counties() -> u64 {
    3142
}

fn default_min_count_ratio() -> f64 {
    0.95
}

fn default_max_missing_ratio() -> f64 {
    0.05
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for countyhealth.yml or countyhealth.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but a missing file yields
    /// the defaults. Parse and validation errors still surface.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::load_from_dir(dir) {
            Err(CoreError::ConfigNotFound { path }) => {
                log::info!("No config at {path}, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        for (key, value) in [
            ("columns.fips", &self.columns.fips),
            ("columns.county_name", &self.columns.county_name),
            ("columns.state", &self.columns.state),
            ("geojson.id_property", &self.geojson.id_property),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("'{key}' cannot be empty"),
                });
            }
        }

        let ratios = [
            ("validation.min_count_ratio", self.validation.min_count_ratio),
            (
                "validation.max_missing_ratio",
                self.validation.max_missing_ratio,
            ),
        ];
        for (key, ratio) in ratios {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("'{key}' must be between 0 and 1, got {ratio}"),
                });
            }
        }

        Ok(())
    }

    /// Resolve a configured path against the project root. Absolute paths and
    /// `:memory:` are returned unchanged.
    pub fn resolve_path(root: &Path, value: &str) -> PathBuf {
        let path = Path::new(value);
        if value == ":memory:" || path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
