//! Epoch-sized views over a window sampler and conversion to Burn tensors.

use burn::prelude::*;
use burn::tensor::TensorData;
use ndarray::{Array2, Array3};

use crate::error::{DataError, Result};
use crate::window::{Minibatch, WindowSampler};
use recur_core::SeqBatch;

/// Default number of minibatches per epoch.
pub const DEFAULT_ITERATION_SIZE: usize = 100;

/// Groups an endless window sampler into epochs of `iteration_size`
/// minibatches.
///
/// # Example
///
/// ```rust,ignore
/// use recur_data::{EpochLoader, WindowSampler};
///
/// let sampler = WindowSampler::builder(series).steps(50).batch_size(32).build()?;
/// let mut loader = EpochLoader::new(sampler, 200)?;
///
/// for minibatch in loader.epoch() {
///     let batch = minibatch.to_seq_batch::<B>(&device)?;
///     // training step
/// }
/// ```
#[derive(Debug)]
pub struct EpochLoader<L = f32> {
    sampler: WindowSampler<L>,
    iteration_size: usize,
    epochs: usize,
}

impl<L> EpochLoader<L>
where
    L: Clone + Default,
{
    /// Wrap a sampler.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidInput`] if `iteration_size` is 0.
    pub fn new(sampler: WindowSampler<L>, iteration_size: usize) -> Result<Self> {
        if iteration_size == 0 {
            return Err(DataError::InvalidInput(
                "iteration_size must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            sampler,
            iteration_size,
            epochs: 0,
        })
    }

    /// Wrap a sampler with [`DEFAULT_ITERATION_SIZE`] minibatches per epoch.
    pub fn with_default_size(sampler: WindowSampler<L>) -> Self {
        Self {
            sampler,
            iteration_size: DEFAULT_ITERATION_SIZE,
            epochs: 0,
        }
    }

    /// Iterate over the minibatches of the next epoch.
    pub fn epoch(&mut self) -> EpochIter<'_, L> {
        self.epochs += 1;
        tracing::debug!(
            "epoch {}: {} minibatches of shape {}",
            self.epochs,
            self.iteration_size,
            self.sampler.batch_shape()
        );
        EpochIter {
            sampler: &mut self.sampler,
            remaining: self.iteration_size,
        }
    }

    /// Minibatches per epoch.
    #[must_use]
    pub fn iteration_size(&self) -> usize {
        self.iteration_size
    }

    /// Number of epochs started so far.
    #[must_use]
    pub fn epochs_started(&self) -> usize {
        self.epochs
    }

    /// The wrapped sampler.
    #[must_use]
    pub fn sampler(&self) -> &WindowSampler<L> {
        &self.sampler
    }

    /// Unwrap the sampler.
    #[must_use]
    pub fn into_sampler(self) -> WindowSampler<L> {
        self.sampler
    }
}

/// Iterator over one epoch of minibatches.
pub struct EpochIter<'a, L> {
    sampler: &'a mut WindowSampler<L>,
    remaining: usize,
}

impl<'a, L> Iterator for EpochIter<'a, L>
where
    L: Clone + Default,
{
    type Item = Minibatch<L>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sampler.sample())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, L> ExactSizeIterator for EpochIter<'a, L> where L: Clone + Default {}

/// Copy a float array into a rank-3 tensor.
pub fn array3_to_tensor<B: Backend>(array: &Array3<f32>, device: &B::Device) -> Tensor<B, 3> {
    let (d0, d1, d2) = array.dim();
    let flat: Vec<f32> = array.iter().copied().collect();
    Tensor::from_data(TensorData::new(flat, [d0, d1, d2]), device)
}

/// Copy a float array into a rank-2 tensor.
pub fn array2_to_tensor<B: Backend>(array: &Array2<f32>, device: &B::Device) -> Tensor<B, 2> {
    let (d0, d1) = array.dim();
    let flat: Vec<f32> = array.iter().copied().collect();
    Tensor::from_data(TensorData::new(flat, [d0, d1]), device)
}

/// Copy an integer array into a rank-2 integer tensor.
pub fn array2_to_int_tensor<B: Backend>(
    array: &Array2<i64>,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let (d0, d1) = array.dim();
    let flat: Vec<i64> = array.iter().copied().collect();
    Tensor::from_data(TensorData::new(flat, [d0, d1]), device)
}

impl Minibatch<f32> {
    /// Convert to a [`SeqBatch`] with continuous targets when labeled.
    ///
    /// # Errors
    ///
    /// Propagates shape errors from [`SeqBatch`].
    pub fn to_seq_batch<B: Backend>(&self, device: &B::Device) -> Result<SeqBatch<B>> {
        let batch = SeqBatch::new(array3_to_tensor(&self.inputs, device));
        match self.labels {
            Some(ref labels) => Ok(batch.with_values(array3_to_tensor(labels, device))?),
            None => Ok(batch),
        }
    }
}

impl Minibatch<i64> {
    /// Convert to a [`SeqBatch`] with per-step class labels.
    ///
    /// # Errors
    ///
    /// Fails if the minibatch is unlabeled or its labels are wider than one
    /// column.
    pub fn to_class_batch<B: Backend>(&self, device: &B::Device) -> Result<SeqBatch<B>> {
        let classes = self.class_indices()?;
        let batch = SeqBatch::new(array3_to_tensor(&self.inputs, device));
        Ok(batch.with_classes(array2_to_int_tensor(&classes, device))?)
    }
}
