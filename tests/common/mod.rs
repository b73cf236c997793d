//! Shared test utilities and fixture generators

#![allow(dead_code)]

use engage::pipeline::DEFAULT_SPORT_COLUMNS;
use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Engagement table with every default sport column.
///
/// Rows:
/// - 0: futebol 10, natacao 30, dias 5, visitas 2, pviews 20
/// - 1: only judo (12), dias 4, visitas 3, pviews 6
/// - 2: no sport time at all (total 0), dias 2, visitas 1, pviews 4
/// - 3: futebol 5, volei 5, tenis 10, dias 0, visitas 0, pviews 0
pub fn create_engagement_dataframe() -> DataFrame {
    let rows: [&[(&str, f64)]; 4] = [
        &[("futebol", 10.0), ("natacao", 30.0)],
        &[("judo", 12.0)],
        &[],
        &[("futebol", 5.0), ("volei", 5.0), ("tenis", 10.0)],
    ];

    let mut columns: Vec<Column> = DEFAULT_SPORT_COLUMNS
        .iter()
        .map(|sport| {
            let values: Vec<f64> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .find(|(name, _)| name == sport)
                        .map(|(_, v)| *v)
                        .unwrap_or(0.0)
                })
                .collect();
            Column::new((*sport).into(), values)
        })
        .collect();

    columns.push(Column::new("dias".into(), [5i64, 4, 2, 0]));
    columns.push(Column::new("visitas".into(), [2i64, 3, 1, 0]));
    columns.push(Column::new("pviews".into(), [20i64, 6, 4, 0]));
    columns.push(Column::new("user_id".into(), ["u1", "u2", "u3", "u4"]));

    DataFrame::new(columns).unwrap()
}

/// Small table with a custom sport set
pub fn create_two_sport_dataframe() -> DataFrame {
    df! {
        "corrida" => [1.0f64, 3.0, 0.0],
        "remo" => [3.0f64, 1.0, 2.0],
        "dias" => [2.0f64, 4.0, 1.0],
        "visitas" => [1.0f64, 2.0, 1.0],
        "pviews" => [4.0f64, 8.0, 2.0],
    }
    .unwrap()
}

/// Create a DataFrame with known correlation patterns
pub fn create_correlation_test_dataframe() -> DataFrame {
    df! {
        "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "b" => [2.0f64, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0], // b = 2*a
        "c" => [10.0f64, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], // reversed a
        "d" => [5.0f64, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0, 6.0, 0.0], // scrambled
        "cubed" => [1.0f64, 8.0, 27.0, 64.0, 125.0, 216.0, 343.0, 512.0, 729.0, 1000.0],
    }
    .unwrap()
}

/// Create a larger random DataFrame for stress tests
pub fn create_large_test_dataframe(rows: usize, cols: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let columns: Vec<Column> = (0..cols)
        .map(|i| {
            let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
            Column::new(format!("feature_{}", i).into(), values)
        })
        .collect();

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Read a single f64 cell
pub fn value(df: &DataFrame, column: &str, row: usize) -> f64 {
    df.column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .get(row)
        .unwrap()
}

/// Assert two floats match within tolerance
pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

/// Assert two tables hold the same values in `columns`, treating NaN as equal to NaN
pub fn assert_same_values(a: &DataFrame, b: &DataFrame, columns: &[String]) {
    assert_eq!(a.height(), b.height(), "Row count mismatch");
    for name in columns {
        for row in 0..a.height() {
            let x = value(a, name, row);
            let y = value(b, name, row);
            assert!(
                x == y || (x.is_nan() && y.is_nan()),
                "{} row {} differs: {} vs {}",
                name,
                row,
                x,
                y
            );
        }
    }
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
