//! Error types for recur_data.

use thiserror::Error;

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while configuring window sampling.
#[derive(Error, Debug)]
pub enum DataError {
    /// The series has no time steps or no features.
    #[error("Series is empty")]
    EmptySeries,

    /// The window length does not fit inside the series.
    #[error("Invalid window size: steps={steps} must be in 1..{len} for a series of {len} steps")]
    InvalidWindowSize {
        /// Requested window length.
        steps: usize,
        /// Number of time steps in the series.
        len: usize,
    },

    /// Batch size error.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(String),

    /// Labels are not aligned with the series.
    #[error("Length mismatch: series has {series} steps but labels have {labels}")]
    LengthMismatch {
        /// Number of time steps in the series.
        series: usize,
        /// Number of time steps in the labels.
        labels: usize,
    },

    /// Invalid data shape.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Core error.
    #[error("Core error: {0}")]
    CoreError(#[from] recur_core::CoreError),
}
