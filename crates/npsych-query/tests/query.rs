//! Tests for SQL over persisted artifacts.

use std::fs::File;
use std::path::Path;

use npsych_query::{QueryError, query, read_artifact};
use polars::prelude::*;
use tempfile::TempDir;

fn neurocog() -> DataFrame {
    df!(
        "scale" => ["FSIQ", "VCI", "PSI"],
        "domain" => ["IQ", "Verbal", "Speed"],
        "z" => [0.0, 0.5, -1.0],
    )
    .unwrap()
}

fn write_csv(dir: &Path, name: &str, df: &DataFrame) {
    let mut file = File::create(dir.join(name)).unwrap();
    let mut df = df.clone();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
}

fn write_parquet(dir: &Path, name: &str, df: &DataFrame) {
    let file = File::create(dir.join(name)).unwrap();
    let mut df = df.clone();
    ParquetWriter::new(file).finish(&mut df).unwrap();
}

#[test]
fn select_with_filter_and_order() {
    let dir = TempDir::new().unwrap();
    write_parquet(dir.path(), "neurocog.parquet", &neurocog());

    let result = query(
        "SELECT scale, z FROM neurocog WHERE z >= 0 ORDER BY z DESC",
        dir.path(),
    )
    .unwrap();
    assert_eq!(result.height(), 2);
    let scale = result.column("scale").unwrap().str().unwrap();
    assert_eq!(scale.get(0), Some("VCI"));
    assert_eq!(scale.get(1), Some("FSIQ"));
}

#[test]
fn parquet_shadows_csv_of_the_same_name() {
    let dir = TempDir::new().unwrap();
    write_parquet(dir.path(), "neurocog.parquet", &neurocog());
    let stale = df!("scale" => ["stale"], "domain" => ["x"], "z" => [9.0]).unwrap();
    write_csv(dir.path(), "neurocog.csv", &stale);

    let result = query("SELECT * FROM neurocog", dir.path()).unwrap();
    assert_eq!(result.height(), 3);
}

#[test]
fn aggregate_over_csv_relation() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "neurocog.csv", &neurocog());

    let result = query("SELECT COUNT(*) AS n FROM neurocog", dir.path()).unwrap();
    assert_eq!(result.height(), 1);
    let n = result.column("n").unwrap().cast(&DataType::Int64).unwrap();
    assert_eq!(n.i64().unwrap().get(0), Some(3));
}

#[test]
fn unknown_relation_carries_expression() {
    let dir = TempDir::new().unwrap();
    write_parquet(dir.path(), "neurocog.parquet", &neurocog());

    let expression = "SELECT * FROM validity";
    let err = query(expression, dir.path()).unwrap_err();
    assert!(matches!(err, QueryError::Execution { .. }));
    assert_eq!(err.expression(), Some(expression));
}

#[test]
fn malformed_sql_carries_expression() {
    let dir = TempDir::new().unwrap();
    write_parquet(dir.path(), "neurocog.parquet", &neurocog());

    let expression = "SELEC scale FROM";
    let err = query(expression, dir.path()).unwrap_err();
    assert_eq!(err.expression(), Some(expression));
}

#[test]
fn unreadable_artifact_is_a_query_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("neurocog.parquet"), b"not parquet").unwrap();

    let expression = "SELECT * FROM neurocog";
    let err = query(expression, dir.path()).unwrap_err();
    assert_eq!(err.expression(), Some(expression));
}

#[test]
fn missing_data_dir_is_a_query_error() {
    let dir = TempDir::new().unwrap();
    let expression = "SELECT 1";
    let err = query(expression, &dir.path().join("absent")).unwrap_err();
    assert_eq!(err.expression(), Some(expression));
}

#[test]
fn csv_artifact_keeps_text_codes_and_numeric_stats() {
    let dir = TempDir::new().unwrap();
    let df = df!(
        "test" => ["007", "010"],
        "z" => [Some(0.25), None],
        "z_sd_domain" => [None::<f64>, None],
    )
    .unwrap();
    write_csv(dir.path(), "neurocog.csv", &df);

    let back = read_artifact(&dir.path().join("neurocog.csv")).unwrap();
    assert_eq!(back.column("test").unwrap().dtype(), &DataType::String);
    assert_eq!(back.column("z").unwrap().dtype(), &DataType::Float64);
    assert_eq!(back.column("z_sd_domain").unwrap().dtype(), &DataType::Float64);

    let test = back.column("test").unwrap().str().unwrap();
    assert_eq!(test.get(0), Some("007"));
    assert_eq!(test.get(1), Some("010"));
    let z = back.column("z").unwrap().f64().unwrap();
    assert_eq!(z.get(0), Some(0.25));
    assert_eq!(z.get(1), None);
    assert_eq!(back.column("z_sd_domain").unwrap().null_count(), 2);
}

#[test]
fn csv_and_parquet_give_the_same_types() {
    let df = df!(
        "test" => ["01"],
        "scale" => ["FSIQ"],
        "percentile" => [50.0],
        "z" => [0.0],
        "z_mean_domain" => [0.0],
        "z_sd_domain" => [None::<f64>],
    )
    .unwrap();
    let csv_dir = TempDir::new().unwrap();
    write_csv(csv_dir.path(), "neurocog.csv", &df);
    let parquet_dir = TempDir::new().unwrap();
    write_parquet(parquet_dir.path(), "neurocog.parquet", &df);

    let expression = "SELECT test, percentile, z_sd_domain FROM neurocog";
    let from_csv = query(expression, csv_dir.path()).unwrap();
    let from_parquet = query(expression, parquet_dir.path()).unwrap();
    assert_eq!(from_csv.schema(), from_parquet.schema());
    assert!(from_csv.equals_missing(&from_parquet));
}

#[test]
fn unreferenced_broken_artifact_is_not_read() {
    let dir = TempDir::new().unwrap();
    write_parquet(dir.path(), "neurocog.parquet", &neurocog());
    std::fs::write(dir.path().join("scratch.parquet"), b"not parquet").unwrap();

    let result = query("SELECT * FROM neurocog", dir.path()).unwrap();
    assert_eq!(result.height(), 3);

    let err = query("SELECT * FROM scratch", dir.path()).unwrap_err();
    assert_eq!(err.expression(), Some("SELECT * FROM scratch"));
}
