//! Sequence batch tensors.

use burn::prelude::*;

use crate::error::{CoreError, Result};
use crate::shape::SeqShape;

/// Target half of a training batch.
#[derive(Debug, Clone)]
pub enum SeqTarget<B: Backend> {
    /// Continuous targets `(T, B, O)`.
    Values(Tensor<B, 3>),
    /// Class index per time step and batch slot `(T, B)`.
    Classes(Tensor<B, 2, Int>),
}

impl<B: Backend> SeqTarget<B> {
    /// The `(time, batch)` extents of the target.
    #[must_use]
    pub fn time_batch(&self) -> [usize; 2] {
        match self {
            Self::Values(t) => {
                let [time, batch, _] = t.dims();
                [time, batch]
            }
            Self::Classes(t) => t.dims(),
        }
    }

    /// Short name used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Values(_) => "values",
            Self::Classes(_) => "classes",
        }
    }
}

/// Per-element loss weights.
///
/// A weight of zero removes a position from the loss, which is how padded
/// time steps of variable-length sequences are masked out.
#[derive(Debug, Clone)]
pub enum SeqWeights<B: Backend> {
    /// One weight per output element `(T, B, O)`.
    Elementwise(Tensor<B, 3>),
    /// One weight per time step and batch slot `(T, B)`.
    PerStep(Tensor<B, 2>),
}

impl<B: Backend> SeqWeights<B> {
    /// The `(time, batch)` extents of the weights.
    #[must_use]
    pub fn time_batch(&self) -> [usize; 2] {
        match self {
            Self::Elementwise(t) => {
                let [time, batch, _] = t.dims();
                [time, batch]
            }
            Self::PerStep(t) => t.dims(),
        }
    }

    /// Tensor rank of the weights.
    #[must_use]
    pub const fn rank(&self) -> usize {
        match self {
            Self::Elementwise(_) => 3,
            Self::PerStep(_) => 2,
        }
    }
}

/// Everything one training step feeds a sequence task.
///
/// `x` is time-major `(T, B, F)`. Targets and weights, when present, cover
/// the same `(T, B)` grid.
///
/// # Example
///
/// ```rust,ignore
/// use recur_core::{SeqBatch, SeqWeights};
///
/// let batch = SeqBatch::new(x)
///     .with_classes(labels)?
///     .with_weights(SeqWeights::PerStep(mask))?;
/// ```
#[derive(Debug, Clone)]
pub struct SeqBatch<B: Backend> {
    /// Input sequences `(T, B, F)`.
    pub x: Tensor<B, 3>,

    /// Optional regression targets or class labels.
    pub target: Option<SeqTarget<B>>,

    /// Optional loss weights.
    pub weights: Option<SeqWeights<B>>,
}

impl<B: Backend> SeqBatch<B> {
    /// Create a batch holding only inputs.
    pub fn new(x: Tensor<B, 3>) -> Self {
        Self {
            x,
            target: None,
            weights: None,
        }
    }

    /// Attach continuous targets.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] if the targets do not cover the
    /// same time steps and batch slots as `x`.
    pub fn with_values(self, targets: Tensor<B, 3>) -> Result<Self> {
        self.with_target(SeqTarget::Values(targets))
    }

    /// Attach per-step class labels.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] on misaligned labels.
    pub fn with_classes(self, labels: Tensor<B, 2, Int>) -> Result<Self> {
        self.with_target(SeqTarget::Classes(labels))
    }

    /// Attach a target of either kind.
    pub fn with_target(mut self, target: SeqTarget<B>) -> Result<Self> {
        self.check_aligned("target", target.time_batch())?;
        self.target = Some(target);
        Ok(self)
    }

    /// Attach loss weights.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] on misaligned weights.
    pub fn with_weights(mut self, weights: SeqWeights<B>) -> Result<Self> {
        self.check_aligned("weights", weights.time_batch())?;
        self.weights = Some(weights);
        Ok(self)
    }

    fn check_aligned(&self, what: &str, time_batch: [usize; 2]) -> Result<()> {
        let shape = self.shape();
        if time_batch != [shape.time(), shape.batch()] {
            return Err(CoreError::ShapeMismatch(format!(
                "{} covers (T={}, B={}) but x is {}",
                what, time_batch[0], time_batch[1], shape
            )));
        }
        Ok(())
    }

    /// Shape of the inputs.
    #[must_use]
    pub fn shape(&self) -> SeqShape {
        SeqShape::from(self.x.dims())
    }

    /// Number of sequences in the batch.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.shape().batch()
    }

    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.shape().time()
    }

    /// Device holding the inputs.
    pub fn device(&self) -> B::Device {
        self.x.device()
    }

    /// Move every tensor of the batch to `device`.
    pub fn to_device(self, device: &B::Device) -> Self {
        Self {
            x: self.x.to_device(device),
            target: self.target.map(|t| match t {
                SeqTarget::Values(v) => SeqTarget::Values(v.to_device(device)),
                SeqTarget::Classes(c) => SeqTarget::Classes(c.to_device(device)),
            }),
            weights: self.weights.map(|w| match w {
                SeqWeights::Elementwise(e) => SeqWeights::Elementwise(e.to_device(device)),
                SeqWeights::PerStep(p) => SeqWeights::PerStep(p.to_device(device)),
            }),
        }
    }
}
