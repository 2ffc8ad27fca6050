//! Error types for recur_core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while assembling sequence tensors.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Two tensors that must share time and batch extents do not.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Wrong number of dimensions.
    #[error("Dimension error: expected {expected} dimensions, got {got}")]
    DimensionError {
        /// Expected number of dimensions.
        expected: usize,
        /// Actual number of dimensions.
        got: usize,
    },
}
