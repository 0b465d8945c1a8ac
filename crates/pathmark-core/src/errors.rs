use thiserror::Error;

/// Errors surfaced while validating input before a model fit.
///
/// Degenerate datasets (no paths, no simulated conversions) are not
/// errors: fits over them return all-zero results instead.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("path at row {row} is empty after tokenization")]
    EmptyPath { row: usize },

    #[error("markov order must be at least 1, got {order}")]
    InvalidOrder { order: usize },

    #[error("revenue at row {row} must be finite and non-negative, got {value}")]
    InvalidRevenue { row: usize, value: f64 },
}

pub type AttributionResult<T> = Result<T, AttributionError>;
