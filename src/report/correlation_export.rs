//! Correlation matrix export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{CorrelatedPair, CorrelationMatrix, CorrelationMethod};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub engage_version: String,
    pub input_file: String,
    pub method: CorrelationMethod,
    /// Whether derived features were added before correlating
    pub derived_features: bool,
}

/// Complete matrix export. Undefined correlations are written as `null`.
#[derive(Serialize)]
pub struct CorrelationExport {
    pub metadata: ExportMetadata,
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
    pub strongest_pairs: Vec<CorrelatedPair>,
}

/// Parameters for the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub derived_features: bool,
    pub top_pairs: usize,
}

impl CorrelationExport {
    pub fn new(matrix: &CorrelationMatrix, params: &ExportParams) -> Self {
        let rows = matrix
            .to_rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|r| if r.is_finite() { Some(r) } else { None })
                    .collect()
            })
            .collect();

        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                engage_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.to_string(),
                method: matrix.method(),
                derived_features: params.derived_features,
            },
            columns: matrix.columns().to_vec(),
            matrix: rows,
            strongest_pairs: matrix
                .strongest_pairs(params.top_pairs)
                .into_iter()
                .map(|mut pair| {
                    pair.correlation = (pair.correlation * 1e4).round() / 1e4;
                    pair
                })
                .collect(),
        }
    }
}

/// Write the correlation matrix and its metadata as pretty-printed JSON
pub fn export_correlation_matrix(
    matrix: &CorrelationMatrix,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = CorrelationExport::new(matrix, params);
    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize correlation matrix")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write export file: {}", output_path.display()))?;
    Ok(())
}
