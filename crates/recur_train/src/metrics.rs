//! Evaluation metrics over sequence batches.

use burn::prelude::*;
use recur_core::{SeqBatch, SeqTarget, SeqWeights};

use crate::error::{Result, TrainError};

/// Trait for sequence metrics.
pub trait Metric<B: Backend>: Send + Sync {
    /// Compute the metric from a model output `(T, B, O)` and the batch it
    /// was computed on.
    fn compute(&self, output: &Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<f32>;

    /// Get the metric name.
    fn name(&self) -> &str;

    /// Whether higher is better.
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Fraction of time steps whose arg-max class matches the label.
///
/// When `weighted` is set and the batch carries per-step weights, each
/// step counts in proportion to its weight.
#[derive(Debug, Clone, Default)]
pub struct SequenceAccuracy {
    /// Use the batch weights.
    pub weighted: bool,
}

impl SequenceAccuracy {
    /// Create an accuracy metric.
    pub fn new(weighted: bool) -> Self {
        Self { weighted }
    }
}

impl<B: Backend> Metric<B> for SequenceAccuracy {
    fn compute(&self, output: &Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<f32> {
        let [time, n, _] = output.dims();
        let labels = match batch.target {
            Some(SeqTarget::Classes(ref labels)) => labels.clone(),
            _ => return Err(TrainError::InvalidInput("accuracy needs class labels".into())),
        };
        if labels.dims() != [time, n] {
            return Err(TrainError::ShapeMismatch(format!(
                "labels {:?} do not match output {:?}",
                labels.dims(),
                output.dims()
            )));
        }

        let predicted = output.clone().argmax(2).reshape([time, n]);
        let correct = predicted.equal(labels).float();

        let score = match (self.weighted, &batch.weights) {
            (true, Some(SeqWeights::PerStep(w))) => {
                (w.clone() * correct).sum() / w.clone().sum()
            }
            (true, Some(SeqWeights::Elementwise(_))) => {
                return Err(TrainError::InvalidInput(
                    "accuracy needs per-step weights".into(),
                ))
            }
            (true, None) => {
                return Err(TrainError::MissingInput {
                    name: "weights",
                    task: "classifier",
                })
            }
            (false, _) => correct.mean(),
        };
        Ok(score.into_scalar().elem())
    }

    fn name(&self) -> &str {
        "accuracy"
    }
}

/// Mean squared error between the output and value targets.
#[derive(Debug, Clone, Default)]
pub struct SequenceMse;

impl<B: Backend> Metric<B> for SequenceMse {
    fn compute(&self, output: &Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<f32> {
        let targets = match batch.target {
            Some(SeqTarget::Values(ref t)) => t.clone(),
            _ => batch.x.clone(),
        };
        if targets.dims() != output.dims() {
            return Err(TrainError::ShapeMismatch(format!(
                "targets {:?} do not match output {:?}",
                targets.dims(),
                output.dims()
            )));
        }
        let diff = output.clone() - targets;
        Ok((diff.clone() * diff).mean().into_scalar().elem())
    }

    fn name(&self) -> &str {
        "mse"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}
