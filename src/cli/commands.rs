//! Subcommand execution: derive and heatmap

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use polars::prelude::DataFrame;

use crate::pipeline::{
    correlation_matrix, derive_features, derived_column_names, estimated_size_mb, load_dataset,
    save_dataset, CorrelationMethod, FeatureConfig, TotalTimeColumn,
};
use crate::report::{
    export_correlation_matrix, save_heatmap, CorrelationSummary, DerivationSummary,
    ExportParams, HeatmapStyle,
};
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_step_time, print_success, print_warning,
};

/// Build the feature configuration: JSON file (or defaults), then CLI overrides.
pub fn resolve_feature_config(
    config_path: Option<&Path>,
    total_column: Option<TotalTimeColumn>,
    sports: &[String],
) -> Result<FeatureConfig> {
    let mut cfg = match config_path {
        Some(path) => FeatureConfig::from_json_file(path)?,
        None => FeatureConfig::default(),
    };
    if let Some(total) = total_column {
        cfg = cfg.with_total_time_column(total);
    }
    if !sports.is_empty() {
        cfg = cfg.with_sport_columns(sports.iter().cloned());
    }
    Ok(cfg)
}

fn load_step(step: u8, input: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    print_step_header(step, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = load_dataset(input, infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", estimated_size_mb(&df));
    print_step_time(step_start.elapsed());
    Ok(df)
}

fn derive_step(step: u8, df: DataFrame, cfg: &FeatureConfig) -> Result<(DataFrame, DerivationSummary)> {
    print_step_header(step, "Derive Features");
    let step_start = Instant::now();
    let mut summary = DerivationSummary::new(df.height(), df.width());

    let spinner = create_spinner("Computing shares, averages and ratios...");
    let df = derive_features(df, cfg)?;
    let derived = derived_column_names(cfg);
    summary.record(&df, &derived)?;
    finish_with_success(&spinner, &format!("Added {} derived column(s)", derived.len()));

    let degenerate = summary.degenerate_columns();
    if degenerate.is_empty() {
        print_info("All derived values are finite");
    } else {
        print_warning(&format!(
            "{} derived column(s) hold inf/NaN from zero divisors",
            degenerate.len()
        ));
    }
    print_step_time(step_start.elapsed());
    Ok((df, summary))
}

/// `engage derive`: load, derive all features, save.
pub fn run_derive(
    input: &Path,
    output: &Path,
    cfg: &FeatureConfig,
    infer_schema_length: usize,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        output,
        &[
            ("Total column", cfg.total_time_name().to_string()),
            ("Sport columns", cfg.sport_columns.len().to_string()),
        ],
    );

    let df = load_step(1, input, infer_schema_length)?;
    let (mut df, summary) = derive_step(2, df, cfg)?;

    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    save_dataset(&mut df, output)?;
    finish_with_success(&spinner, &format!("Saved to {}", output.display()));
    print_step_time(step_start.elapsed());

    summary.display();
    print_completion("Feature derivation complete!");
    Ok(())
}

/// Options for `engage heatmap`
pub struct HeatmapOptions<'a> {
    pub method: CorrelationMethod,
    pub derive: Option<&'a FeatureConfig>,
    pub style: HeatmapStyle,
    pub export_json: Option<&'a Path>,
    pub top: usize,
    pub infer_schema_length: usize,
}

/// `engage heatmap`: load, optionally derive, correlate, render.
pub fn run_heatmap(input: &Path, output: &Path, opts: &HeatmapOptions) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        output,
        &[
            ("Method", opts.method.to_string()),
            ("Derive features", opts.derive.is_some().to_string()),
            (
                "Image size",
                format!("{}x{}", opts.style.width, opts.style.height),
            ),
        ],
    );

    let mut step = 1;
    let mut df = load_step(step, input, opts.infer_schema_length)?;
    step += 1;

    if let Some(cfg) = opts.derive {
        let (derived, summary) = derive_step(step, df, cfg)?;
        df = derived;
        summary.display();
        step += 1;
    }

    print_step_header(step, "Correlation Matrix");
    let step_start = Instant::now();
    let spinner = create_spinner(&format!("Computing {} correlations...", opts.method));
    let matrix = correlation_matrix(&df, opts.method)?;
    finish_with_success(
        &spinner,
        &format!("Correlated {} numeric column(s)", matrix.len()),
    );
    if matrix.len() < 2 {
        print_warning("Fewer than two numeric columns: the heatmap will be empty");
    }
    print_step_time(step_start.elapsed());
    step += 1;

    print_step_header(step, "Render Heatmap");
    let step_start = Instant::now();
    let spinner = create_spinner("Drawing heatmap...");
    save_heatmap(output, &matrix, &opts.style)?;
    finish_with_success(&spinner, &format!("Saved to {}", output.display()));

    if let Some(path) = opts.export_json {
        let input_file = input.display().to_string();
        export_correlation_matrix(
            &matrix,
            path,
            &ExportParams {
                input_file: &input_file,
                derived_features: opts.derive.is_some(),
                top_pairs: opts.top,
            },
        )?;
        print_success(&format!("Matrix exported to {}", path.display()));
    }
    print_step_time(step_start.elapsed());

    CorrelationSummary::from_matrix(&matrix, opts.top).display();
    print_completion("Correlation heatmap complete!");
    Ok(())
}
