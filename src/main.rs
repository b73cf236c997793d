//! Engage CLI
//!
//! Derives engagement features from sport-portal usage data and renders
//! triangle correlation heatmaps.

use anyhow::Result;
use clap::Parser;

use engage::cli::commands::{resolve_feature_config, run_derive, run_heatmap, HeatmapOptions};
use engage::cli::{Cli, Commands};
use engage::report::HeatmapStyle;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = cli.command.output_path();

    match &cli.command {
        Commands::Derive {
            input,
            total_column,
            sports,
            config,
            infer_schema_length,
            ..
        } => {
            let cfg = resolve_feature_config(config.as_deref(), *total_column, sports)?;
            run_derive(input, &output, &cfg, *infer_schema_length)
        }
        Commands::Heatmap {
            input,
            method,
            derive,
            config,
            width,
            height,
            export_json,
            top,
            infer_schema_length,
            ..
        } => {
            let cfg = if *derive {
                Some(resolve_feature_config(config.as_deref(), None, &[])?)
            } else {
                None
            };
            let opts = HeatmapOptions {
                method: *method,
                derive: cfg.as_ref(),
                style: HeatmapStyle::default().with_size(*width, *height),
                export_json: export_json.as_deref(),
                top: *top,
                infer_schema_length: *infer_schema_length,
            };
            run_heatmap(input, &output, &opts)
        }
    }
}
