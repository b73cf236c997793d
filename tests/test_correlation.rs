//! Unit tests for correlation analysis

use engage::pipeline::{
    correlation_matrix, derive_features, numeric_column_names, CorrelationMethod, FeatureConfig,
    FeatureError,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

const METHODS: [CorrelationMethod; 3] = [
    CorrelationMethod::Pearson,
    CorrelationMethod::Spearman,
    CorrelationMethod::Kendall,
];

#[test]
fn test_perfect_positive_and_negative_pairs() {
    let df = common::create_correlation_test_dataframe();

    for method in METHODS {
        let matrix = correlation_matrix(&df, method).unwrap();
        let ab = matrix.get_by_name("a", "b").unwrap();
        let ac = matrix.get_by_name("a", "c").unwrap();
        assert!((ab - 1.0).abs() < 1e-12, "{}: a-b should be 1.0, got {}", method, ab);
        assert!((ac + 1.0).abs() < 1e-12, "{}: a-c should be -1.0, got {}", method, ac);
    }
}

#[test]
fn test_rank_methods_see_monotonic_relation() {
    let df = common::create_correlation_test_dataframe();

    let pearson = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
    let spearman = correlation_matrix(&df, CorrelationMethod::Spearman).unwrap();
    let kendall = correlation_matrix(&df, CorrelationMethod::Kendall).unwrap();

    let linear = pearson.get_by_name("a", "cubed").unwrap();
    assert!(linear < 0.99, "cubic relation is not perfectly linear, got {}", linear);
    assert!((spearman.get_by_name("a", "cubed").unwrap() - 1.0).abs() < 1e-12);
    assert!((kendall.get_by_name("a", "cubed").unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_matrix_is_symmetric_with_unit_diagonal() {
    let df = common::create_correlation_test_dataframe();

    for method in METHODS {
        let matrix = correlation_matrix(&df, method).unwrap();
        assert_eq!(matrix.len(), 5);
        for i in 0..matrix.len() {
            assert_eq!(matrix.get(i, i), 1.0, "{}: diagonal at {}", method, i);
            for j in 0..matrix.len() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i), "{}: ({}, {})", method, i, j);
            }
        }
    }
}

#[test]
fn test_known_pearson_value() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        "y" => [2.0f64, 4.0, 5.0, 4.0, 5.0],
    }
    .unwrap();

    let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
    // cov = 6 / sqrt(10 * 6)
    let expected = 6.0 / (10.0f64 * 6.0).sqrt();
    assert!((matrix.get(1, 0) - expected).abs() < 1e-12);
}

#[test]
fn test_known_spearman_with_ties() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        "y" => [2.0f64, 4.0, 5.0, 4.0, 5.0],
    }
    .unwrap();

    // ranks of y: [1, 2.5, 4.5, 2.5, 4.5]
    let matrix = correlation_matrix(&df, CorrelationMethod::Spearman).unwrap();
    let expected = engage::pipeline::pearson(
        &[1.0, 2.0, 3.0, 4.0, 5.0],
        &[1.0, 2.5, 4.5, 2.5, 4.5],
    );
    assert!((matrix.get(1, 0) - expected).abs() < 1e-12);
    // 7 / sqrt(90)
    assert!((expected - 0.7378647873726218).abs() < 1e-9);
}

#[test]
fn test_constant_column_gives_nan() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0],
        "flat" => [4.0f64, 4.0, 4.0],
    }
    .unwrap();

    for method in METHODS {
        let matrix = correlation_matrix(&df, method).unwrap();
        assert!(matrix.get(1, 1).is_nan(), "{}: constant diagonal", method);
        assert!(matrix.get(0, 1).is_nan(), "{}: pair with constant", method);
        assert_eq!(matrix.get(0, 0), 1.0);
    }
}

#[test]
fn test_non_finite_values_are_dropped_pairwise() {
    let df = df! {
        "x" => [1.0f64, 2.0, f64::NAN, 4.0, f64::INFINITY, 6.0],
        "y" => [2.0f64, 4.0, 100.0, 8.0, -3.0, 12.0],
    }
    .unwrap();

    for method in METHODS {
        let matrix = correlation_matrix(&df, method).unwrap();
        let r = matrix.get_by_name("x", "y").unwrap();
        assert!((r - 1.0).abs() < 1e-12, "{}: expected 1.0 on finite rows, got {}", method, r);
    }
}

#[test]
fn test_null_values_are_dropped_pairwise() {
    let df = df! {
        "x" => [Some(1.0f64), Some(2.0), None, Some(4.0)],
        "y" => [Some(1.0f64), Some(2.0), Some(-50.0), Some(4.0)],
    }
    .unwrap();

    let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
    assert!((matrix.get(0, 1) - 1.0).abs() < 1e-12);
}

#[test]
fn test_non_numeric_columns_ignored() {
    let df = df! {
        "numeric" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        "string_col" => ["a", "b", "c", "d", "e"],
        "int_col" => [5i64, 4, 3, 2, 1],
    }
    .unwrap();

    assert_eq!(numeric_column_names(&df), vec!["numeric", "int_col"]);
    let matrix = correlation_matrix(&df, CorrelationMethod::Spearman).unwrap();
    assert_eq!(matrix.columns(), &["numeric".to_string(), "int_col".to_string()]);
    assert!((matrix.get(0, 1) + 1.0).abs() < 1e-12);
}

#[test]
fn test_single_column_and_empty_tables() {
    let single = df! { "only_col" => [1.0f64, 2.0, 3.0] }.unwrap();
    let matrix = correlation_matrix(&single, CorrelationMethod::Pearson).unwrap();
    assert_eq!(matrix.len(), 1);
    assert_eq!(matrix.lower_triangle().count(), 0);

    let empty = DataFrame::empty();
    let matrix = correlation_matrix(&empty, CorrelationMethod::Pearson).unwrap();
    assert!(matrix.is_empty());
}

#[test]
fn test_lower_triangle_excludes_diagonal() {
    let df = common::create_correlation_test_dataframe();
    let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();

    let cells: Vec<(usize, usize)> = matrix.lower_triangle().map(|(i, j, _)| (i, j)).collect();
    assert_eq!(cells.len(), 10);
    assert!(cells.iter().all(|(i, j)| j < i));
    assert_eq!(cells[0], (1, 0));
}

#[test]
fn test_strongest_pairs_sorted_by_absolute_value() {
    let df = common::create_correlation_test_dataframe();
    let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();

    let pairs = matrix.strongest_pairs(4);
    assert_eq!(pairs.len(), 4);
    for w in pairs.windows(2) {
        assert!(w[0].correlation.abs() >= w[1].correlation.abs());
    }
    assert!((pairs[0].correlation.abs() - 1.0).abs() < 1e-12);
}

#[test]
fn test_method_names_parse_case_insensitively() {
    assert_eq!("pearson".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Pearson);
    assert_eq!("Spearman".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Spearman);
    assert_eq!("KENDALL".parse::<CorrelationMethod>().unwrap(), CorrelationMethod::Kendall);
    assert_eq!(CorrelationMethod::default(), CorrelationMethod::Spearman);
}

#[test]
fn test_unknown_method_is_signalled() {
    let err = "cosine".parse::<CorrelationMethod>().unwrap_err();
    assert!(matches!(err, FeatureError::UnknownMethod(ref name) if name == "cosine"));
    assert!(err.to_string().contains("cosine"));
}

#[test]
fn test_matrix_over_derived_table() {
    let df = derive_features(common::create_engagement_dataframe(), &FeatureConfig::default())
        .unwrap();
    let matrix = correlation_matrix(&df, CorrelationMethod::Spearman).unwrap();

    // user_id is the only non-numeric column
    assert_eq!(matrix.len(), df.width() - 1);
    for i in 0..matrix.len() {
        for j in 0..matrix.len() {
            let (a, b) = (matrix.get(i, j), matrix.get(j, i));
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
}

#[test]
fn test_large_random_table_stays_in_range() {
    let df = common::create_large_test_dataframe(500, 8);

    for method in METHODS {
        let matrix = correlation_matrix(&df, method).unwrap();
        for (_, _, r) in matrix.lower_triangle() {
            assert!((-1.0..=1.0).contains(&r), "{}: out of range {}", method, r);
        }
    }
}

#[test]
fn test_boolean_columns_correlate_as_zero_one() {
    let df = df! {
        "score" => [1.0f64, 2.0, 3.0, 4.0],
        "active" => [false, false, true, true],
        "label" => ["a", "b", "c", "d"],
    }
    .unwrap();

    assert_eq!(numeric_column_names(&df), vec!["score", "active"]);
    let matrix = correlation_matrix(&df, CorrelationMethod::Pearson).unwrap();
    // 2 / sqrt(5 * 1)
    let expected = 2.0 / 5.0f64.sqrt();
    assert!((matrix.get_by_name("score", "active").unwrap() - expected).abs() < 1e-12);
}
