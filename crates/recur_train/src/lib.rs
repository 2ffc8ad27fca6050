//! # recur_train
//!
//! Recurrent task variants for recur-rs.
//!
//! This crate provides:
//! - [`TaskConfig`] and [`Task`]: autoencoder, predictor, regressor and
//!   classifier variants that declare their inputs and compute a loss
//! - Input declarations ([`InputSpec`], [`sequence_inputs`]) and
//!   minibatch conversion ([`ToSeqBatch`])
//! - Sequence losses ([`WeightedMseLoss`], [`NextStepLoss`], [`SequenceNllLoss`])
//! - Metrics ([`SequenceAccuracy`], [`SequenceMse`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use recur_train::TaskConfig;
//!
//! let task = TaskConfig::classifier().with_weighted(true).init::<B>();
//! let loss = task.loss(&model, &batch)?;
//! let grads = loss.backward();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod inputs;
pub mod losses;
pub mod metrics;
pub mod task;

pub use error::{Result, TrainError};
pub use inputs::{check_inputs, sequence_inputs, InputDtype, InputRole, InputSpec, ToSeqBatch};
pub use losses::{NextStepLoss, SequenceNllLoss, WeightedMseLoss, PROB_CLIP_MAX, PROB_CLIP_MIN};
pub use metrics::{Metric, SequenceAccuracy, SequenceMse};
pub use task::{
    AutoencoderTask, ClassifierTask, PredictionFn, PredictorTask, RegressorTask, SequenceTask,
    Task, TaskConfig, TaskKind,
};
// Re-export the model seam for convenience
pub use recur_core::SequenceModel;
