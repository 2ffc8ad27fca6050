//! # recur_data
//!
//! Windowed minibatch sampling for training recurrent models on long time
//! series.
//!
//! This crate provides:
//! - [`WindowSampler`] drawing random fixed-length windows, optionally with
//!   time-aligned labels
//! - [`batches`], the zero-argument minibatch callable
//! - [`OffsetSampler`] strategies for choosing window starts
//! - [`EpochLoader`] grouping minibatches into epochs
//! - Conversion of sampled arrays into Burn tensors
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array2;
//! use recur_core::Seed;
//! use recur_data::batches;
//!
//! let series = Array2::from_shape_fn((10, 1), |(t, _)| t as f32);
//! let mut next_batch = batches::<f32>(series, None, 3, 2, Seed::new(42)).unwrap();
//!
//! let arrays = next_batch().into_arrays();
//! assert_eq!(arrays.len(), 1);
//! assert_eq!(arrays[0].dim(), (3, 2, 1));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod loader;
mod sampler;
mod window;

pub use error::{DataError, Result};
pub use loader::{
    array2_to_int_tensor, array2_to_tensor, array3_to_tensor, EpochIter, EpochLoader,
    DEFAULT_ITERATION_SIZE,
};
pub use sampler::{OffsetSampler, SequentialOffsets, UniformOffsets};
pub use window::{
    batches, Minibatch, SamplerConfig, WindowSampler, WindowSamplerBuilder, DEFAULT_BATCH_SIZE,
    DEFAULT_STEPS,
};
