//! # recur
//!
//! Recurrent sequence tasks and windowed minibatch sampling on Burn.
//!
//! recur-rs provides the pieces that sit between a long time series and a
//! recurrent model's training step:
//!
//! - **Sampling**: random fixed-length windows, stacked time-major, with
//!   time-aligned labels
//! - **Tasks**: autoencoder, predictor, regressor and classifier variants
//!   that declare their inputs and compute a scalar loss
//! - **Losses**: weighted squared error, next-step error and per-step
//!   negative log-likelihood
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recur::prelude::*;
//!
//! let mut sampler = WindowSampler::builder(series)
//!     .labels(labels)
//!     .steps(100)
//!     .batch_size(64)
//!     .seed(Seed::new(42))
//!     .build()?;
//!
//! let task = TaskConfig::classifier().init::<B>();
//! let batch = sampler.sample().to_class_batch::<B>(&device)?;
//! let loss = task.loss(&model, &batch)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `backend-ndarray` (default): CPU backend using ndarray

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use recur_core as core;
pub use recur_data as data;
pub use recur_train as train;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use recur::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use recur_core::{Seed, SeqBatch, SeqShape, SeqTarget, SeqWeights, SequenceModel};

    // Data
    pub use recur_data::{
        batches, EpochLoader, Minibatch, SamplerConfig, SequentialOffsets, UniformOffsets,
        WindowSampler,
    };

    // Tasks
    pub use recur_train::{
        ClassifierTask, PredictorTask, SequenceTask, Task, TaskConfig, TaskKind, ToSeqBatch,
    };
}

/// All module for importing everything.
pub mod all {
    pub use super::prelude::*;

    pub use recur_core::backend;
    pub use recur_data::{
        array2_to_int_tensor, array2_to_tensor, array3_to_tensor, DataError, OffsetSampler,
        WindowSamplerBuilder,
    };
    pub use recur_train::{
        sequence_inputs, InputSpec, Metric, NextStepLoss, SequenceAccuracy, SequenceNllLoss,
        TrainError, WeightedMseLoss,
    };
}
