//! Sequence loss functions.
//!
//! All losses take time-major tensors and reduce to a single-element
//! tensor, so they backpropagate when evaluated on an autodiff backend.
//! Weighted variants divide by the sum of the weights instead of the
//! element count.

use burn::prelude::*;

use crate::error::{Result, TrainError};

/// Lower clip bound applied to class probabilities before the log.
pub const PROB_CLIP_MIN: f64 = 1e-8;

/// Upper clip bound applied to class probabilities before the log.
pub const PROB_CLIP_MAX: f64 = 1.0;

/// `mean(err²)`, or `sum(w * err²) / sum(w)` when weights are given.
fn squared_error<B: Backend, const D: usize>(
    err: Tensor<B, D>,
    weights: Option<Tensor<B, D>>,
) -> Tensor<B, 1> {
    let sq = err.clone() * err;
    match weights {
        Some(w) => (w.clone() * sq).sum() / w.sum(),
        None => sq.mean(),
    }
}

fn expect_dims<const D: usize>(what: &str, got: [usize; D], expected: [usize; D]) -> Result<()> {
    if got != expected {
        return Err(TrainError::ShapeMismatch(format!(
            "{} has shape {:?}, expected {:?}",
            what, got, expected
        )));
    }
    Ok(())
}

/// Mean squared error over sequences, optionally weighted per element.
///
/// Used for reconstruction (autoencoder) and regression.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedMseLoss;

impl WeightedMseLoss {
    /// Create a new loss.
    pub fn new() -> Self {
        Self
    }

    /// Compute the loss.
    ///
    /// # Arguments
    ///
    /// * `preds` - Model outputs `(T, B, O)`
    /// * `targets` - Targets `(T, B, O)`
    /// * `weights` - Optional weights `(T, B, O)`
    ///
    /// # Errors
    ///
    /// [`TrainError::ShapeMismatch`] if the shapes differ.
    pub fn forward<B: Backend>(
        &self,
        preds: Tensor<B, 3>,
        targets: Tensor<B, 3>,
        weights: Option<Tensor<B, 3>>,
    ) -> Result<Tensor<B, 1>> {
        let dims = preds.dims();
        expect_dims("targets", targets.dims(), dims)?;
        if let Some(ref w) = weights {
            expect_dims("weights", w.dims(), dims)?;
        }
        Ok(squared_error(preds - targets, weights))
    }
}

/// Next-step prediction error.
///
/// The prediction made at step `t` is scored against the input at `t + 1`:
/// `err = inputs[1..] - predictions[..T-1]`. Weights are aligned with the
/// inputs, so `weights[1..]` scale the error terms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextStepLoss;

impl NextStepLoss {
    /// Create a new loss.
    pub fn new() -> Self {
        Self
    }

    /// Compute the loss.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Input sequences `(T, B, F)`
    /// * `predictions` - Predicted next inputs `(T, B, F)`
    /// * `weights` - Optional weights `(T, B, F)`
    ///
    /// # Errors
    ///
    /// [`TrainError::InvalidInput`] for sequences shorter than 2 steps and
    /// [`TrainError::ShapeMismatch`] if the shapes differ.
    pub fn forward<B: Backend>(
        &self,
        inputs: Tensor<B, 3>,
        predictions: Tensor<B, 3>,
        weights: Option<Tensor<B, 3>>,
    ) -> Result<Tensor<B, 1>> {
        let dims = inputs.dims();
        let [time, batch, features] = dims;
        if time < 2 {
            return Err(TrainError::InvalidInput(format!(
                "next-step error needs at least 2 time steps, got {}",
                time
            )));
        }
        expect_dims("predictions", predictions.dims(), dims)?;
        if let Some(ref w) = weights {
            expect_dims("weights", w.dims(), dims)?;
        }

        let truth = inputs.slice([1..time, 0..batch, 0..features]);
        let guess = predictions.slice([0..time - 1, 0..batch, 0..features]);
        let weights = weights.map(|w| w.slice([1..time, 0..batch, 0..features]));

        Ok(squared_error(truth - guess, weights))
    }
}

/// Per-step negative log-likelihood of the true class.
///
/// Time and batch axes are flattened into `n = T * B` positions. At each
/// position the probability assigned to the true class is clipped to
/// `[PROB_CLIP_MIN, PROB_CLIP_MAX]` and its negative log taken. The result
/// is the mean over positions, or the weighted mean with per-step weights.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceNllLoss;

impl SequenceNllLoss {
    /// Create a new loss.
    pub fn new() -> Self {
        Self
    }

    /// Compute the loss.
    ///
    /// # Arguments
    ///
    /// * `probs` - Class probabilities `(T, B, C)`
    /// * `labels` - Class indices `(T, B)`
    /// * `weights` - Optional per-step weights `(T, B)`
    ///
    /// # Errors
    ///
    /// [`TrainError::ShapeMismatch`] on misaligned labels or weights and
    /// [`TrainError::InvalidInput`] for labels outside `0..C`.
    pub fn forward<B: Backend>(
        &self,
        probs: Tensor<B, 3>,
        labels: Tensor<B, 2, Int>,
        weights: Option<Tensor<B, 2>>,
    ) -> Result<Tensor<B, 1>> {
        let [time, batch, n_classes] = probs.dims();
        expect_dims("labels", labels.dims(), [time, batch])?;
        if let Some(ref w) = weights {
            expect_dims("weights", w.dims(), [time, batch])?;
        }
        check_label_range(&labels, n_classes)?;

        let n = time * batch;
        let correct = labels.reshape([n, 1]);
        let picked = probs.reshape([n, n_classes]).gather(1, correct).reshape([n]);
        let nlp = picked.clamp(PROB_CLIP_MIN, PROB_CLIP_MAX).log().neg();

        Ok(match weights {
            Some(w) => {
                let w = w.reshape([n]);
                (w.clone() * nlp).sum() / w.sum()
            }
            None => nlp.mean(),
        })
    }
}

fn check_label_range<B: Backend>(labels: &Tensor<B, 2, Int>, n_classes: usize) -> Result<()> {
    let min: i64 = labels.clone().min().into_scalar().elem();
    let max: i64 = labels.clone().max().into_scalar().elem();
    if min < 0 || max >= n_classes as i64 {
        return Err(TrainError::InvalidInput(format!(
            "labels span {}..={} but the output has {} classes",
            min, max, n_classes
        )));
    }
    Ok(())
}
