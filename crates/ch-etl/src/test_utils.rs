//! Shared fixtures for pipeline and analysis tests.
//!
//! Counties are unit squares laid out on a grid so that horizontally
//! adjacent squares share an edge.

use crate::pipeline::EtlPipeline;
use ch_core::config::{ColumnConfig, DataConfig, DatabaseConfig};
use ch_core::{Config, SpatialMode};
use ch_db::DuckDbBackend;
use serde_json::{json, Value};
use std::path::Path;

pub const SAMPLE_HEALTH_FILE: &str = "sample_health.csv";
pub const SAMPLE_COUNTIES_FILE: &str = "sample_counties.json";
pub const SAMPLE_DICTIONARY_FILE: &str = "data_dictionary.csv";

/// Measures of the five-county sample, in column order.
pub const SAMPLE_MEASURES: &[&str] = &["Premature death", "Adult obesity", "Adult smoking"];

pub const SAMPLE_DICTIONARY_CSV: &str = "Variable Name,Description,Measure
v001_rawvalue,\"Years of potential life lost before age 75 per 100,000 population (age-adjusted).\",Premature death
v001_numerator,Numerator of premature death.,Premature death
v011_rawvalue,Percentage of the adult population (age 18 and older) that reports a BMI of 30 or more.,Adult obesity
v009_rawvalue,Percentage of adults who are current smokers.,Adult smoking
";

/// One synthetic county.
#[derive(Debug, Clone)]
pub struct SampleCounty {
    pub fips: String,
    pub name: String,
    pub state: String,
    /// Lower-left corner of the county square.
    pub origin: (f64, f64),
    /// Raw text per measure; empty for a blank cell.
    pub values: Vec<String>,
}

impl SampleCounty {
    pub fn new(fips: &str, name: &str, origin: (f64, f64), values: &[&str]) -> Self {
        Self {
            fips: fips.to_string(),
            name: name.to_string(),
            state: "AL".to_string(),
            origin,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Five Alabama counties. The first three form a row of touching squares;
/// the last two are isolated.
pub fn sample_counties() -> Vec<SampleCounty> {
    vec![
        SampleCounty::new("01001", "Autauga County", (-86.5, 32.5), &["7890", "0.321", "0.178"]),
        SampleCounty::new("01003", "Baldwin County", (-86.4, 32.5), &["6543", "0.289", "0.152"]),
        SampleCounty::new("01005", "Barbour County", (-86.3, 32.5), &["9876", "0.354", "0.213"]),
        SampleCounty::new("01007", "Bibb County", (-85.0, 33.0), &["8765", "0.337", "0.191"]),
        SampleCounty::new("01009", "Blount County", (-84.0, 34.0), &["7654", "0.312", "0.184"]),
    ]
}

/// Side length of each county square.
pub const SQUARE_SIZE: f64 = 0.1;

fn square(origin: (f64, f64)) -> Value {
    let (x, y) = origin;
    let (x1, y1) = (round6(x + SQUARE_SIZE), round6(y + SQUARE_SIZE));
    json!({
        "type": "Polygon",
        "coordinates": [[[x, y], [x1, y], [x1, y1], [x, y1], [x, y]]]
    })
}

/// Keeps shared edges bit-identical between neighbours (`-86.5 + 0.1`
/// must equal the literal `-86.4`).
fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Health CSV with `County` and `State` name columns.
pub fn health_csv(measures: &[&str], counties: &[SampleCounty]) -> String {
    let mut header = vec!["5-digit FIPS Code".to_string(), "County".into(), "State".into()];
    header.extend(measures.iter().map(|m| format!("{m} raw value")));
    let mut out = header.join(",");
    out.push('\n');
    for county in counties {
        let mut fields = vec![county.fips.clone(), csv_field(&county.name), county.state.clone()];
        fields.extend(county.values.iter().map(|v| csv_field(v)));
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// FeatureCollection with one square per county.
pub fn counties_geojson(counties: &[SampleCounty]) -> Value {
    let features: Vec<Value> = counties
        .iter()
        .map(|c| {
            json!({
                "type": "Feature",
                "properties": {"GEOID": c.fips, "NAME": c.name, "STATEFP": &c.fips[..2]},
                "geometry": square(c.origin)
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

/// Write health CSV, GeoJSON and dictionary into `dir`.
pub fn write_project(
    dir: &Path,
    measures: &[&str],
    counties: &[SampleCounty],
    dictionary: Option<&str>,
) -> std::io::Result<()> {
    std::fs::write(dir.join(SAMPLE_HEALTH_FILE), health_csv(measures, counties))?;
    std::fs::write(
        dir.join(SAMPLE_COUNTIES_FILE),
        counties_geojson(counties).to_string(),
    )?;
    if let Some(text) = dictionary {
        std::fs::write(dir.join(SAMPLE_DICTIONARY_FILE), text)?;
    }
    Ok(())
}

/// Write the five-county sample project into `dir`.
pub fn write_sample_project(dir: &Path) -> std::io::Result<()> {
    write_project(
        dir,
        SAMPLE_MEASURES,
        &sample_counties(),
        Some(SAMPLE_DICTIONARY_CSV),
    )
}

/// Configuration matching the fixture files, with an in-memory database
/// and the spatial extension disabled.
pub fn sample_config() -> Config {
    Config {
        name: "sample".to_string(),
        database: DatabaseConfig {
            path: ":memory:".to_string(),
            spatial: SpatialMode::Disabled,
            ..DatabaseConfig::default()
        },
        data: DataConfig {
            health_csv: SAMPLE_HEALTH_FILE.to_string(),
            counties_geojson: SAMPLE_COUNTIES_FILE.to_string(),
            dictionary_file: SAMPLE_DICTIONARY_FILE.to_string(),
        },
        columns: ColumnConfig {
            fips: "5-digit FIPS Code".to_string(),
            county_name: "County".to_string(),
            state: "State".to_string(),
        },
        ..Config::default()
    }
}

/// Run the pipeline over the files in `dir` into a fresh in-memory database.
///
/// # Panics
/// Panics when the run fails; meant for tests only.
pub fn load_project(dir: &Path) -> (DuckDbBackend, Config) {
    let config = sample_config();
    let db = DuckDbBackend::in_memory().expect("in-memory database");
    let outcome = EtlPipeline::new(&db, &config, dir).run();
    assert!(outcome.success, "ETL failed: {:?}", outcome.error);
    (db, config)
}
