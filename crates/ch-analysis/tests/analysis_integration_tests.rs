//! End-to-end read operations over projects loaded by the ETL pipeline.

use ch_analysis::{
    choropleth, correlation, county_details, county_neighbors, moran, variable_stats,
    AnalysisContext, AnalysisError, StatsMode, VariableRegistry,
};
use ch_core::names::SPATIAL_TABLE;
use ch_db::Database;
use ch_etl::test_utils::{
    counties_geojson, load_project, sample_counties, write_project, write_sample_project,
    SampleCounty, SAMPLE_COUNTIES_FILE, SAMPLE_MEASURES,
};
use tempfile::TempDir;

fn sample_project() -> (TempDir, ch_db::DuckDbBackend, ch_core::Config) {
    let dir = TempDir::new().unwrap();
    write_sample_project(dir.path()).unwrap();
    let (db, config) = load_project(dir.path());
    (dir, db, config)
}

/// `side * side` counties on a grid; obesity follows the column, smoking is
/// scattered.
fn grid_project(side: usize) -> (TempDir, ch_db::DuckDbBackend, ch_core::Config) {
    let counties: Vec<SampleCounty> = (0..side * side)
        .map(|i| {
            let (col, row) = (i % side, i / side);
            let obesity = format!("0.{:02}", 10 + col * 3);
            let smoking = format!("0.{:02}", 10 + (i * 37) % 17);
            SampleCounty::new(
                &format!("01{:03}", i + 1),
                &format!("County {i:03}"),
                (-90.0 + col as f64, 30.0 + row as f64),
                &[&obesity, &smoking],
            )
        })
        .collect();
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), &["Adult obesity", "Adult smoking"], &counties, None).unwrap();
    let (db, config) = load_project(dir.path());
    (dir, db, config)
}

#[test]
fn test_registry_lists_sample_variables() {
    let (_dir, db, _config) = sample_project();
    let registry = VariableRegistry::load(&db).unwrap();
    let names: Vec<&str> = registry.variables().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["premature_death", "adult_obesity", "adult_smoking"]);

    let obesity = registry.get("adult_obesity").unwrap();
    assert_eq!(obesity.units, "percentage");
    assert!(obesity.description.contains("BMI of 30 or more"));
}

#[test]
fn test_raw_stats() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let stats = variable_stats(&ctx, "premature_death", StatsMode::Raw).unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.mean, Some(8145.6));
    assert_eq!(stats.min, Some(6543.0));
    assert_eq!(stats.max, Some(9876.0));
    assert_eq!(stats.median, Some(7890.0));
    assert!(stats.std.unwrap() > 0.0);
    assert_eq!(stats.transformed, None);
}

#[test]
fn test_transformed_obesity_mean() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let stats = variable_stats(&ctx, "adult_obesity", StatsMode::Transformed).unwrap();
    assert_eq!(stats.mean, Some(32.26));
    assert_eq!(stats.min, Some(28.9));
    assert_eq!(stats.max, Some(35.4));
    assert_eq!(stats.median, Some(32.1));
    assert_eq!(stats.units, "percentage");
    assert_eq!(stats.transformed, Some(true));

    let raw = variable_stats(&ctx, "adult_obesity", StatsMode::Raw).unwrap();
    assert_eq!(raw.mean, Some(0.32));
}

#[test]
fn test_transform_leaves_other_variables_unscaled() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let stats = variable_stats(&ctx, "premature_death", StatsMode::Transformed).unwrap();
    assert_eq!(stats.transformed, Some(false));
    assert_eq!(stats.max, Some(9876.0));
}

#[test]
fn test_unknown_variable_rejected() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let err = variable_stats(&ctx, "not_a_variable", StatsMode::Raw).unwrap_err();
    assert!(matches!(err, AnalysisError::Validation { .. }));
    assert_eq!(err.message(), "Invalid variable name");
    assert!(err.details().contains("premature_death"));
}

#[test]
fn test_stats_skip_non_numeric_values() {
    let mut counties = sample_counties();
    counties[0].values[1] = "N/A".to_string();
    counties[1].values[1] = "-0.2".to_string();
    counties[2].values[1] = String::new();
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), SAMPLE_MEASURES, &counties, None).unwrap();
    let (db, config) = load_project(dir.path());
    let ctx = AnalysisContext::new(&db, &config.columns);

    let stats = variable_stats(&ctx, "adult_obesity", StatsMode::Raw).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.min, Some(0.31));
    assert_eq!(stats.max, Some(0.34));
}

#[test]
fn test_small_fractions_are_counted() {
    let mut counties = sample_counties();
    counties[0].values[2] = "0.00001".to_string();
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), SAMPLE_MEASURES, &counties, None).unwrap();
    let (db, config) = load_project(dir.path());
    let ctx = AnalysisContext::new(&db, &config.columns);

    let stats = variable_stats(&ctx, "adult_smoking", StatsMode::Raw).unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.min, Some(0.0));
}

#[test]
fn test_stats_without_valid_values_are_null() {
    let mut counties = sample_counties();
    for county in &mut counties {
        county.values[2] = "NA".to_string();
    }
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), SAMPLE_MEASURES, &counties, None).unwrap();
    let (db, config) = load_project(dir.path());
    let ctx = AnalysisContext::new(&db, &config.columns);

    let stats = variable_stats(&ctx, "adult_smoking", StatsMode::Raw).unwrap();
    assert_eq!(stats.count, 0);
    assert_eq!(stats.mean, None);
    assert_eq!(stats.median, None);

    let err = choropleth(&ctx, "adult_smoking").unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
    assert_eq!(err.message(), "No valid data found for choropleth");
}

#[test]
fn test_choropleth_features_and_metadata() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let map = choropleth(&ctx, "adult_obesity").unwrap();

    assert_eq!(map.kind, "FeatureCollection");
    assert_eq!(map.features.len(), 5);
    assert_eq!(map.metadata.total_features, 5);
    assert_eq!(map.metadata.value_range.count, 5);
    assert_eq!(map.metadata.value_range.min, 0.289);
    assert_eq!(map.metadata.value_range.max, 0.354);
    assert_eq!(map.metadata.class_breaks, vec![0.289, 0.312, 0.321, 0.337, 0.354]);

    let fips: Vec<&str> = map.features.iter().map(|f| f.properties.fips.as_str()).collect();
    assert_eq!(fips, vec!["01001", "01003", "01005", "01007", "01009"]);

    let baldwin = &map.features[1];
    assert_eq!(baldwin.properties.county_name.as_deref(), Some("Baldwin County"));
    assert_eq!(baldwin.properties.state_name.as_deref(), Some("AL"));
    assert_eq!(baldwin.properties.class, 1);
    assert_eq!(baldwin.geometry["type"], "Polygon");
    assert_eq!(map.features[2].properties.class, 4);

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"][0]["type"], "Feature");
    assert_eq!(json["metadata"]["units"], "percentage");
}

#[test]
fn test_correlation_needs_ten_pairs() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let err = correlation(&ctx, "adult_obesity", "adult_smoking").unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    assert_eq!(err.message(), "Insufficient valid data for correlation");
}

#[test]
fn test_correlation_over_grid() {
    let (_dir, db, config) = grid_project(4);
    let ctx = AnalysisContext::new(&db, &config.columns);

    let same = correlation(&ctx, "adult_obesity", "adult_obesity").unwrap();
    assert_eq!(same.correlation, 1.0);
    assert_eq!(same.p_value, 0.0);
    assert_eq!(same.n, 16);

    let mixed = correlation(&ctx, "adult_obesity", "adult_smoking").unwrap();
    assert!((-1.0..=1.0).contains(&mixed.correlation));
    assert!((0.0..=1.0).contains(&mixed.p_value));
    assert_eq!(mixed.var1, "adult_obesity");
    assert_eq!(mixed.var2, "adult_smoking");
}

#[test]
fn test_correlation_unknown_variable() {
    let (_dir, db, config) = grid_project(4);
    let ctx = AnalysisContext::new(&db, &config.columns);
    let err = correlation(&ctx, "adult_obesity", "nope").unwrap_err();
    assert_eq!(err.message(), "Invalid variable name");
}

#[test]
fn test_moran_needs_fifty_counties() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let err = moran(&ctx, "adult_obesity").unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    assert_eq!(err.message(), "Insufficient data for spatial autocorrelation analysis");
}

#[test]
fn test_moran_detects_gradient() {
    let (_dir, db, config) = grid_project(8);
    let ctx = AnalysisContext::new(&db, &config.columns);
    let result = moran(&ctx, "adult_obesity").unwrap();
    assert_eq!(result.n, 64);
    assert_eq!(result.expected_i, -0.0159);
    assert!(result.moran_i > 0.5);
    assert!(result.z_score > 2.0);
    assert_eq!(result.interpretation, "positive");
}

#[test]
fn test_choropleth_skips_unreadable_geometry() {
    let (_dir, db, config) = sample_project();
    db.execute_batch(&format!(
        "UPDATE {SPATIAL_TABLE} SET geometry = 'POLYGON ((broken' WHERE fips_code = '01005'"
    ))
    .unwrap();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let map = choropleth(&ctx, "adult_obesity").unwrap();

    assert_eq!(map.features.len(), 4);
    assert_eq!(map.metadata.total_features, 4);
    assert_eq!(map.metadata.value_range.count, 4);
    assert_eq!(map.metadata.value_range.max, 0.337);
    assert!(map.features.iter().all(|f| f.properties.fips != "01005"));
}

#[test]
fn test_county_details() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    let details = county_details(&ctx, "01001").unwrap();
    assert_eq!(details.fips, "01001");
    assert_eq!(details.county_name.as_deref(), Some("Autauga County"));
    assert_eq!(details.state.as_deref(), Some("AL"));
    assert_eq!(details.health_indicators.len(), 3);
    assert_eq!(
        details.health_indicators["premature_death"].as_deref(),
        Some("7890")
    );
    assert_eq!(
        details.health_indicators["adult_obesity"].as_deref(),
        Some("0.321")
    );
    assert_eq!(details.geometry.unwrap()["type"], "Polygon");
}

#[test]
fn test_county_lookup_errors() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);

    let err = county_details(&ctx, "99999").unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
    assert_eq!(err.details(), "FIPS code '99999' not found in dataset");

    let err = county_details(&ctx, "1001").unwrap_err();
    assert!(matches!(err, AnalysisError::Validation { .. }));

    let err = county_neighbors(&ctx, "abcde").unwrap_err();
    assert!(matches!(err, AnalysisError::Validation { .. }));
    let err = county_neighbors(&ctx, "99999").unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
}

#[test]
fn test_county_without_geometry_not_found() {
    let counties = sample_counties();
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), SAMPLE_MEASURES, &counties, None).unwrap();
    std::fs::write(
        dir.path().join(SAMPLE_COUNTIES_FILE),
        counties_geojson(&counties[..4]).to_string(),
    )
    .unwrap();
    let (db, config) = load_project(dir.path());
    let ctx = AnalysisContext::new(&db, &config.columns);

    assert!(county_details(&ctx, "01007").is_ok());
    let err = county_details(&ctx, "01009").unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
    assert_eq!(err.details(), "FIPS code '01009' not found in dataset");
}

#[test]
fn test_neighbors_share_edges() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);

    let middle = county_neighbors(&ctx, "01003").unwrap();
    assert_eq!(middle.target_fips, "01003");
    let fips: Vec<&str> = middle.neighbors.iter().map(|n| n.fips.as_str()).collect();
    assert_eq!(fips, vec!["01001", "01005"]);
    assert_eq!(middle.count, 2);
    assert_eq!(middle.neighbors[0].county_name.as_deref(), Some("Autauga County"));

    let isolated = county_neighbors(&ctx, "01009").unwrap();
    assert!(isolated.neighbors.is_empty());
    assert_eq!(isolated.count, 0);
}

#[test]
fn test_reads_run_concurrently() {
    let (_dir, db, config) = sample_project();
    let ctx = AnalysisContext::new(&db, &config.columns);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| variable_stats(&ctx, "adult_obesity", StatsMode::Raw)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().count, 5);
        }
    });
}
