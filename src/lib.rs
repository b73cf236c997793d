//! Engage: engagement feature derivation library
//!
//! Derives per-subject engagement features (sport time shares, per-day and
//! per-visit averages, sport counts) from a polars table and renders
//! triangle correlation heatmaps of any numeric table.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
