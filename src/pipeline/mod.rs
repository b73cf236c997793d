//! Pipeline module - feature derivation and correlation analysis

pub mod config;
pub mod correlation;
pub mod error;
pub mod features;
pub mod loader;

pub use config::*;
pub use correlation::*;
pub use error::*;
pub use features::*;
pub use loader::*;
