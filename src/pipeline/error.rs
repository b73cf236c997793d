//! Error types for feature derivation and correlation analysis.
//!
//! Division by a zero total, day, visit or page-view count is deliberately
//! absent from this enum: those rows yield non-finite values instead of
//! failing.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the library pipeline steps.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A column required by a derivation step is not present in the table.
    #[error("required column '{column}' not found in dataset")]
    MissingColumn {
        /// Name of the absent column
        column: String,
    },

    /// Correlation method name did not match any supported method.
    #[error("unknown correlation method '{0}'. Supported methods: pearson, spearman, kendall")]
    UnknownMethod(String),

    /// Error bubbled up from polars while evaluating column expressions.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Convenience alias used across the pipeline module.
pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
