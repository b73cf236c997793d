//! Report module - summaries, matrix export and heatmap rendering

pub mod colormap;
pub mod correlation_export;
pub mod heatmap;
pub mod summary;

pub use correlation_export::*;
pub use heatmap::*;
pub use summary::*;
