//! Error types for sequence tasks.

use thiserror::Error;

/// Result type alias for task operations.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors raised while evaluating a task on a batch.
#[derive(Error, Debug)]
pub enum TrainError {
    /// A declared input is absent from the batch.
    #[error("Missing input `{name}` required by the {task} task")]
    MissingInput {
        /// Name of the declared input.
        name: &'static str,
        /// Task that declared it.
        task: &'static str,
    },

    /// An input is present but of the wrong kind or value range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Output and target extents disagree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Data error.
    #[error("Data error: {0}")]
    DataError(#[from] recur_data::DataError),

    /// Core error.
    #[error("Core error: {0}")]
    CoreError(#[from] recur_core::CoreError),
}
