use super::*;
use std::io::Write;

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.geometry_storage(), GeometryStorage::Wkt);
}

#[test]
fn test_open_with_spatial_disabled() {
    let config = DatabaseConfig {
        spatial: SpatialMode::Disabled,
        ..DatabaseConfig::default()
    };
    let db = DuckDbBackend::open(":memory:", &config).unwrap();
    assert_eq!(db.geometry_storage(), GeometryStorage::Wkt);
}

#[test]
fn test_open_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.duckdb");
    let config = DatabaseConfig {
        spatial: SpatialMode::Disabled,
        ..DatabaseConfig::default()
    };
    {
        let db = DuckDbBackend::open(path.to_str().unwrap(), &config).unwrap();
        db.execute_batch("CREATE TABLE kept AS SELECT 1 AS id").unwrap();
    }
    let reopened = DuckDbBackend::from_path(&path).unwrap();
    assert!(reopened.relation_exists("kept").unwrap());
}

#[test]
fn test_create_table_and_view() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE test_table AS SELECT 1 AS id, 'hello' AS name")
        .unwrap();
    db.create_view_as("test_view", "SELECT id FROM test_table", true)
        .unwrap();

    assert!(db.relation_exists("test_table").unwrap());
    assert!(db.relation_exists("test_view").unwrap());
    assert!(!db.relation_exists("nonexistent").unwrap());
}

#[test]
fn test_statements_share_one_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .unwrap();
    assert_eq!(db.query_count("SELECT * FROM nums").unwrap(), 10);
}

#[test]
fn test_drop_if_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE to_drop AS SELECT 1 AS id").unwrap();
    db.create_view_as("view_drop", "SELECT 1 AS id", false).unwrap();

    db.drop_if_exists("to_drop").unwrap();
    db.drop_if_exists("view_drop").unwrap();
    db.drop_if_exists("never_existed").unwrap();

    assert!(!db.relation_exists("to_drop").unwrap());
    assert!(!db.relation_exists("view_drop").unwrap());
}

#[test]
fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.query_rows("SELECT * FROM missing_table", &[]).unwrap_err();
    assert!(matches!(err, DbError::RelationMissing(_)), "{err}");
}

#[test]
fn test_query_rows_with_params() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t (code VARCHAR, n BIGINT, x DOUBLE, flag BOOLEAN);
         INSERT INTO t VALUES ('01001', 7, 1.5, true), ('01003', NULL, NULL, NULL);",
    )
    .unwrap();

    let result = db
        .query_rows(
            "SELECT code, n, x, flag FROM t WHERE code = ?",
            &[SqlValue::from("01001")],
        )
        .unwrap();
    assert_eq!(result.columns, vec!["code", "n", "x", "flag"]);
    assert_eq!(
        result.rows,
        vec![vec![
            SqlValue::Text("01001".into()),
            SqlValue::Int(7),
            SqlValue::Double(1.5),
            SqlValue::Bool(true),
        ]]
    );

    let nulls = db
        .query_rows("SELECT n, x FROM t WHERE code = '01003'", &[])
        .unwrap();
    assert_eq!(nulls.first().unwrap(), &[SqlValue::Null, SqlValue::Null]);
}

#[test]
fn test_query_rows_empty_result_has_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = db
        .query_rows("SELECT 1 AS a, 'x' AS b WHERE false", &[])
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.column_index("b"), Some(1));
}

#[test]
fn test_insert_rows_in_transaction() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE s (fips VARCHAR, geometry VARCHAR)")
        .unwrap();
    let rows = vec![
        vec![SqlValue::from("01001"), SqlValue::from("POLYGON((0 0, 1 0, 1 1, 0 0))")],
        vec![SqlValue::from("01003"), SqlValue::Null],
    ];
    let affected = db
        .insert_rows("INSERT INTO s VALUES (?, ?)", &rows)
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(db.query_count("SELECT * FROM s").unwrap(), 2);
}

#[test]
fn test_insert_rows_rolls_back_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE s (n INTEGER NOT NULL)").unwrap();
    let rows = vec![vec![SqlValue::Int(1)], vec![SqlValue::Null]];
    assert!(db.insert_rows("INSERT INTO s VALUES (?)", &rows).is_err());
    assert_eq!(
        db.query_count("SELECT * FROM s").unwrap(),
        0,
        "first row should have been rolled back"
    );
}

#[test]
fn test_load_csv_keeps_text_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "health.csv",
        "5-digit FIPS Code,Name,Adult obesity raw value\n01001,Autauga County,0.321\n01003,Baldwin County,0.289\n",
    );
    let db = DuckDbBackend::in_memory().unwrap();
    let options = CsvLoadOptions::default().with_text_column("5-digit FIPS Code");
    let count = db.load_csv("county_health", &path, &options).unwrap();
    assert_eq!(count, 2);

    let result = db
        .query_rows(
            "SELECT \"5-digit FIPS Code\", \"Adult obesity raw value\" FROM county_health ORDER BY 1",
            &[],
        )
        .unwrap();
    assert_eq!(result.rows[0][0], SqlValue::Text("01001".into()));
    assert_eq!(result.rows[0][1], SqlValue::Double(0.321));

    let columns = db.describe("county_health").unwrap();
    assert_eq!(columns[0], ("5-digit FIPS Code".to_string(), "VARCHAR".to_string()));
    assert_eq!(columns[2].1, "DOUBLE");
}

#[test]
fn test_load_csv_all_varchar() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "dict.csv", "Variable Name,Description\nv001_rawvalue,Deaths\n");
    let db = DuckDbBackend::in_memory().unwrap();
    db.load_csv("dict", &path, &CsvLoadOptions::all_varchar())
        .unwrap();
    let result = db.query_rows("SELECT * FROM dict", &[]).unwrap();
    assert_eq!(result.columns, vec!["Variable Name", "Description"]);
    assert_eq!(result.rows[0][0].as_str(), Some("v001_rawvalue"));
}

#[test]
fn test_csv_columns_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        &dir,
        "health.csv",
        "5-digit FIPS Code,Name,Adult obesity raw value\n01001,Autauga County,0.00001\n",
    );
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(
        db.csv_columns(&path).unwrap(),
        vec!["5-digit FIPS Code", "Name", "Adult obesity raw value"]
    );
    let err = db.csv_columns("/nonexistent/file.csv").unwrap_err();
    assert!(matches!(err, DbError::CsvLoad(_)), "{err}");
}

#[test]
fn test_load_csv_text_columns_keep_source_digits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "small.csv", "id,v\n1,0.00001\n");
    let db = DuckDbBackend::in_memory().unwrap();
    let options = CsvLoadOptions::default().with_text_column("v");
    db.load_csv("small", &path, &options).unwrap();
    let result = db.query_rows("SELECT v FROM small", &[]).unwrap();
    assert_eq!(result.rows[0][0], SqlValue::Text("0.00001".into()));
}

#[test]
fn test_load_csv_missing_file() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .load_csv("t", "/nonexistent/file.csv", &CsvLoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, DbError::CsvLoad(_)), "{err}");
}

#[test]
fn test_read_csv_sql() {
    let options = CsvLoadOptions::default().with_text_column("5-digit FIPS Code");
    assert_eq!(
        read_csv_sql("data/a.csv", &options),
        "SELECT * FROM read_csv_auto('data/a.csv', header = true, types = {'5-digit FIPS Code': 'VARCHAR'})"
    );
}

#[test]
fn test_concurrent_reads() {
    let db = std::sync::Arc::new(DuckDbBackend::in_memory().unwrap());
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(100) t(n)")
        .unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = db.clone();
            std::thread::spawn(move || db.query_count("SELECT * FROM nums WHERE n % 2 = 0").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 50);
    }
}
