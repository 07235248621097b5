use super::*;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: test_project").unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.columns.fips, "5-digit FIPS Code");
    assert_eq!(config.geojson.id_property, "GEOID");
    assert_eq!(config.validation.expected_counties, 3142);
    assert_eq!(config.database.spatial, SpatialMode::Auto);
    assert_eq!(config.server.port, 8000);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: explorer
database:
  path: ":memory:"
  spatial: disabled
  threads: 2
  memory_limit: 1GB
data:
  health_csv: input/health.csv
  counties_geojson: input/counties.geojson
  dictionary_file: dict.csv
columns:
  fips: fips
  county_name: County
  state: State
geojson:
  id_property: GEO_ID
  name_property: NAMELSAD
  state_property: STATE
validation:
  expected_counties: 100
  min_count_ratio: 0.9
  max_missing_ratio: 0.1
server:
  host: 0.0.0.0
  port: 9000
  cors_allow_any: false
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.database.spatial, SpatialMode::Disabled);
    assert_eq!(config.database.threads, Some(2));
    assert_eq!(config.columns.county_name, "County");
    assert_eq!(config.geojson.name_property, "NAMELSAD");
    assert_eq!(config.validation.expected_counties, 100);
    assert!(!config.server.cors_allow_any);
    assert_eq!(
        config.data.dictionary_path(Path::new("input/health.csv")),
        PathBuf::from("input/dict.csv")
    );
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nbogus: 1");
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_or_default_missing_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.name, "county-health");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("countyhealth.yaml"), "name: from_yaml\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");
}

#[test]
fn test_invalid_ratio_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("countyhealth.yml"),
        "name: x\nvalidation:\n  min_count_ratio: 1.5\n",
    )
    .unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_empty_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("countyhealth.yml"), "name: \"\"\n").unwrap();
    assert!(Config::load_from_dir(dir.path()).is_err());
}

#[test]
fn test_resolve_path() {
    let root = Path::new("/srv/project");
    assert_eq!(
        Config::resolve_path(root, "data/x.csv"),
        PathBuf::from("/srv/project/data/x.csv")
    );
    assert_eq!(
        Config::resolve_path(root, "/abs/x.csv"),
        PathBuf::from("/abs/x.csv")
    );
    assert_eq!(
        Config::resolve_path(root, ":memory:"),
        PathBuf::from(":memory:")
    );
}
