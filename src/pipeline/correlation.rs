//! Pairwise correlation matrices (Pearson, Spearman, Kendall tau-b)

use std::str::FromStr;

use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{FeatureError, FeatureResult};

/// Pairwise association measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Linear (Pearson product-moment)
    Pearson,
    /// Rank-based monotonic (Spearman rho)
    #[default]
    Spearman,
    /// Concordance-based (Kendall tau-b)
    Kendall,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            "kendall" => Ok(CorrelationMethod::Kendall),
            _ => Err(FeatureError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a pair of columns and their correlation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Square, symmetric correlation matrix over named columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    method: CorrelationMethod,
    columns: Vec<String>,
    values: Mat<f64>,
}

impl CorrelationMatrix {
    pub fn method(&self) -> CorrelationMethod {
        self.method
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.get(i, j))
    }

    /// Cells strictly below the diagonal as `(row, col, value)`, row-major.
    pub fn lower_triangle(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.len()).flat_map(move |i| (0..i).map(move |j| (i, j, self.get(i, j))))
    }

    /// Rows of the matrix as plain vectors, for serialization.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| (0..self.len()).map(|j| self.get(i, j)).collect())
            .collect()
    }

    /// Finite off-diagonal pairs sorted by absolute correlation, strongest first.
    pub fn strongest_pairs(&self, limit: usize) -> Vec<CorrelatedPair> {
        let mut pairs: Vec<CorrelatedPair> = self
            .lower_triangle()
            .filter(|(_, _, r)| r.is_finite())
            .map(|(i, j, r)| CorrelatedPair {
                feature1: self.columns[j].clone(),
                feature2: self.columns[i].clone(),
                correlation: r,
            })
            .collect();

        pairs.sort_by(|a, b| {
            b.correlation
                .abs()
                .partial_cmp(&a.correlation.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs.truncate(limit);
        pairs
    }
}

/// Names of all numeric or boolean columns, in table order.
///
/// Booleans are correlated as 0/1.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric() || col.dtype().is_bool())
        .map(|col| col.name().to_string())
        .collect()
}

/// Compute the correlation matrix over every numeric column of `df`.
///
/// Observations are taken pairwise: for each pair of columns only rows where
/// both values are finite contribute. Pairs with fewer than two such rows or
/// with a constant side come out as `NaN`, and so does the diagonal entry of
/// a constant column.
pub fn correlation_matrix(
    df: &DataFrame,
    method: CorrelationMethod,
) -> FeatureResult<CorrelationMatrix> {
    let columns = numeric_column_names(df);

    let data: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| -> FeatureResult<Vec<Option<f64>>> {
            let column = df.column(name)?.cast(&DataType::Float64)?;
            let values = column
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            Ok(values)
        })
        .collect::<FeatureResult<_>>()?;

    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let off_diagonal: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let (x, y) = complete_pairs(&data[i], &data[j]);
            ((i, j), pair_correlation(&x, &y, method))
        })
        .collect();

    let mut values = Mat::<f64>::zeros(n, n);
    for (i, col) in data.iter().enumerate() {
        let finite: Vec<f64> = col.iter().flatten().copied().collect();
        values[(i, i)] = if has_variance(&finite) { 1.0 } else { f64::NAN };
    }
    for ((i, j), r) in off_diagonal {
        values[(i, j)] = r;
        values[(j, i)] = r;
    }

    Ok(CorrelationMatrix {
        method,
        columns,
        values,
    })
}

/// Keep only rows where both sides are present.
fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

fn has_variance(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().any(|v| v != first),
        None => false,
    }
}

fn pair_correlation(x: &[f64], y: &[f64], method: CorrelationMethod) -> f64 {
    if x.len() < 2 || !has_variance(x) || !has_variance(y) {
        return f64::NAN;
    }
    match method {
        CorrelationMethod::Pearson => pearson(x, y),
        CorrelationMethod::Spearman => pearson(&average_ranks(x), &average_ranks(y)),
        CorrelationMethod::Kendall => kendall_tau_b(x, y),
    }
}

/// Pearson correlation using Welford's single-pass update.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        n += 1.0;
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        mean_x += dx / n;
        mean_y += dy / n;
        var_x += dx * (xi - mean_x);
        var_y += dy * (yi - mean_y);
        cov_xy += dx * (yi - mean_y);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// 1-based ranks with ties sharing the average of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Kendall tau-b in O(n log n) (Knight's algorithm).
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let total = (n * (n.saturating_sub(1)) / 2) as f64;
    let x_ties = tied_pairs(points.iter().map(|p| p.0));
    let joint_ties = tied_pairs_by(&points, |a, b| a == b);

    let mut ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let mut buffer = vec![0.0; n];
    let discordant = merge_sort_count(&mut ys, &mut buffer) as f64;
    let y_ties = tied_pairs(ys.iter().copied());

    let denominator = ((total - x_ties) * (total - y_ties)).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    let numerator = total - x_ties - y_ties + joint_ties - 2.0 * discordant;
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Number of tied pairs in an already sorted sequence.
fn tied_pairs<I: Iterator<Item = f64>>(sorted: I) -> f64 {
    let values: Vec<f64> = sorted.collect();
    tied_pairs_by(&values, |a, b| a == b)
}

fn tied_pairs_by<T, F: Fn(&T, &T) -> bool>(sorted: &[T], eq: F) -> f64 {
    let mut ties = 0.0;
    let mut run = 1.0;
    for w in sorted.windows(2) {
        if eq(&w[0], &w[1]) {
            run += 1.0;
        } else {
            ties += run * (run - 1.0) / 2.0;
            run = 1.0;
        }
    }
    if !sorted.is_empty() {
        ties += run * (run - 1.0) / 2.0;
    }
    ties
}

/// Stable merge sort returning the number of strict inversions.
fn merge_sort_count(values: &mut [f64], buffer: &mut [f64]) -> u64 {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let mid = n / 2;
    let mut swaps = {
        let (left, right) = values.split_at_mut(mid);
        let (buf_left, buf_right) = buffer.split_at_mut(mid);
        merge_sort_count(left, buf_left) + merge_sort_count(right, buf_right)
    };

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < mid && j < n {
        if values[j] < values[i] {
            buffer[k] = values[j];
            swaps += (mid - i) as u64;
            j += 1;
        } else {
            buffer[k] = values[i];
            i += 1;
        }
        k += 1;
    }
    while i < mid {
        buffer[k] = values[i];
        i += 1;
        k += 1;
    }
    while j < n {
        buffer[k] = values[j];
        j += 1;
        k += 1;
    }
    values.copy_from_slice(&buffer[..n]);
    swaps
}
