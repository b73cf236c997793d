//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{CorrelationMethod, TotalTimeColumn};

/// Engage - derive engagement features and plot correlation heatmaps
#[derive(Parser, Debug)]
#[command(name = "engage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append derived engagement features to a dataset
    Derive {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to input directory with '_features' suffix (e.g., data.csv -> data_features.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the total sport time column
        #[arg(long, value_enum)]
        total_column: Option<TotalTimeColumn>,

        /// Sport-time columns (comma-separated). Defaults to the sixteen portal sections.
        #[arg(long, value_delimiter = ',')]
        sports: Vec<String>,

        /// JSON feature configuration file. Flags above override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan (very slow for large files).
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Render a triangle correlation heatmap of the numeric columns
    Heatmap {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Image output path (PNG or SVG, determined by extension).
        /// Defaults to input directory with '_correlation.png' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Correlation method: pearson, spearman or kendall
        #[arg(short, long, default_value = "spearman", value_parser = parse_method)]
        method: CorrelationMethod,

        /// Derive engagement features before correlating
        #[arg(long, default_value = "false")]
        derive: bool,

        /// JSON feature configuration file used with --derive
        #[arg(long)]
        config: Option<PathBuf>,

        /// Image width in pixels
        #[arg(long, default_value = "1600", value_parser = clap::value_parser!(u32).range(200..))]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "600", value_parser = clap::value_parser!(u32).range(200..))]
        height: u32,

        /// Also write the correlation matrix as JSON to this path
        #[arg(long)]
        export_json: Option<PathBuf>,

        /// Number of strongest pairs listed in the summary
        #[arg(long, default_value = "10")]
        top: usize,

        /// Number of rows to use for schema inference (CSV only)
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

fn parse_method(s: &str) -> Result<CorrelationMethod, String> {
    s.parse::<CorrelationMethod>().map_err(|e| e.to_string())
}

/// Sibling of `input` named `<stem><suffix>.<extension>`.
pub fn derive_output_path(input: &Path, suffix: &str, extension: Option<&str>) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = extension
        .or_else(|| input.extension().and_then(|e| e.to_str()))
        .unwrap_or("parquet");
    parent.join(format!("{}{}.{}", stem, suffix, extension))
}

impl Commands {
    pub fn input(&self) -> &Path {
        match self {
            Commands::Derive { input, .. } | Commands::Heatmap { input, .. } => input,
        }
    }

    /// Get the output path, deriving it from the input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        match self {
            Commands::Derive { input, output, .. } => output
                .clone()
                .unwrap_or_else(|| derive_output_path(input, "_features", None)),
            Commands::Heatmap { input, output, .. } => output
                .clone()
                .unwrap_or_else(|| derive_output_path(input, "_correlation", Some("png"))),
        }
    }
}
