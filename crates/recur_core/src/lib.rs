//! # recur_core
//!
//! Core types shared by the recur-rs crates.
//!
//! This crate provides:
//! - [`Seed`] for reproducible window sampling
//! - [`SeqShape`] for time-major shape metadata
//! - [`SeqBatch`] bundling inputs, targets and loss weights for one step
//! - [`SequenceModel`], the seam between tasks and recurrent models
//! - Error types
//!
//! ## Shape Convention
//!
//! Sequence tensors are time-major, `(T, B, F)`:
//! - `T`: Time steps
//! - `B`: Batch size
//! - `F`: Features per step
//!
//! ## Example
//!
//! ```rust
//! use recur_core::{Seed, SeqShape};
//!
//! let seed = Seed::new(42);
//! let shape = SeqShape::new(100, 64, 3); // steps=100, batch=64, features=3
//! assert_eq!(shape.positions(), 6400);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod model_trait;
mod seed;
mod shape;
mod tensor;

pub use error::{CoreError, Result};
pub use model_trait::SequenceModel;
pub use seed::Seed;
pub use shape::SeqShape;
pub use tensor::{SeqBatch, SeqTarget, SeqWeights};

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
