//! # pathmark-core
//!
//! Foundation crate for the pathmark attribution toolkit.
//! Defines the input records, errors, config, and constants shared by the
//! model crates. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod records;

// Re-export the most commonly used types at the crate root.
pub use config::{HeuristicConfig, MarkovConfig};
pub use errors::{AttributionError, AttributionResult};
pub use records::{aggregate_paths, PathRecord};
