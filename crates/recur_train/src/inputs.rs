//! Named input declarations.
//!
//! Every task consumes the input sequences `x`; some add a target array,
//! and weighted tasks add a weight array last. [`sequence_inputs`] builds
//! that list so the four task variants share one declaration rule.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};
use recur_core::{SeqBatch, SeqTarget};
use recur_data::Minibatch;

/// Element type of a declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputDtype {
    /// Floating point.
    Float,
    /// Integer class indices.
    Int,
}

/// What a declared input feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputRole {
    /// Input sequences.
    Inputs,
    /// Continuous targets.
    Targets,
    /// Class labels.
    Labels,
    /// Loss weights.
    Weights,
}

/// Declaration of one named input a training step consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputSpec {
    /// Input name.
    pub name: &'static str,
    /// Role of the input.
    pub role: InputRole,
    /// Tensor rank.
    pub rank: usize,
    /// Element type.
    pub dtype: InputDtype,
}

impl InputSpec {
    /// `x`: float `(T, B, F)`.
    #[must_use]
    pub const fn inputs() -> Self {
        Self {
            name: "x",
            role: InputRole::Inputs,
            rank: 3,
            dtype: InputDtype::Float,
        }
    }

    /// `targets`: float `(T, B, O)`.
    #[must_use]
    pub const fn targets() -> Self {
        Self {
            name: "targets",
            role: InputRole::Targets,
            rank: 3,
            dtype: InputDtype::Float,
        }
    }

    /// `labels`: integer `(T, B)`.
    #[must_use]
    pub const fn labels() -> Self {
        Self {
            name: "labels",
            role: InputRole::Labels,
            rank: 2,
            dtype: InputDtype::Int,
        }
    }

    /// `weights`: float, rank 3 for elementwise or 2 for per-step weights.
    #[must_use]
    pub const fn weights(rank: usize) -> Self {
        Self {
            name: "weights",
            role: InputRole::Weights,
            rank,
            dtype: InputDtype::Float,
        }
    }
}

/// Declare `x`, then `target` if given, then `weights` of `weight_rank`
/// when `weighted`.
///
/// ```rust
/// use recur_train::{sequence_inputs, InputSpec};
///
/// let names: Vec<_> = sequence_inputs(true, Some(InputSpec::labels()), 2)
///     .iter()
///     .map(|spec| spec.name)
///     .collect();
/// assert_eq!(names, ["x", "labels", "weights"]);
/// ```
#[must_use]
pub fn sequence_inputs(
    weighted: bool,
    target: Option<InputSpec>,
    weight_rank: usize,
) -> Vec<InputSpec> {
    let mut specs = Vec::with_capacity(3);
    specs.push(InputSpec::inputs());
    specs.extend(target);
    if weighted {
        specs.push(InputSpec::weights(weight_rank));
    }
    specs
}

/// Check that `batch` supplies every input in `specs`.
///
/// # Errors
///
/// [`TrainError::MissingInput`] for an absent input and
/// [`TrainError::InvalidInput`] for one of the wrong kind or rank.
pub fn check_inputs<B: Backend>(
    task: &'static str,
    specs: &[InputSpec],
    batch: &SeqBatch<B>,
) -> Result<()> {
    for spec in specs {
        let missing = TrainError::MissingInput {
            name: spec.name,
            task,
        };
        match spec.role {
            InputRole::Inputs => {}
            InputRole::Targets => match batch.target {
                Some(SeqTarget::Values(_)) => {}
                Some(ref other) => {
                    return Err(TrainError::InvalidInput(format!(
                        "{} task expects float targets, got {}",
                        task,
                        other.kind()
                    )))
                }
                None => return Err(missing),
            },
            InputRole::Labels => match batch.target {
                Some(SeqTarget::Classes(_)) => {}
                Some(ref other) => {
                    return Err(TrainError::InvalidInput(format!(
                        "{} task expects class labels, got {}",
                        task,
                        other.kind()
                    )))
                }
                None => return Err(missing),
            },
            InputRole::Weights => match batch.weights {
                Some(ref weights) if weights.rank() == spec.rank => {}
                Some(ref weights) => {
                    return Err(TrainError::InvalidInput(format!(
                        "{} task expects rank-{} weights, got rank {}",
                        task,
                        spec.rank,
                        weights.rank()
                    )))
                }
                None => return Err(missing),
            },
        }
    }
    Ok(())
}

/// A sampled minibatch that can be fed to a task.
///
/// Float labels become value targets; integer labels become per-step
/// classes.
pub trait ToSeqBatch {
    /// Copy the minibatch onto `device` as a [`SeqBatch`].
    ///
    /// # Errors
    ///
    /// Propagates conversion errors from the data crate.
    fn to_batch<B: Backend>(&self, device: &B::Device) -> Result<SeqBatch<B>>;
}

impl ToSeqBatch for Minibatch<f32> {
    fn to_batch<B: Backend>(&self, device: &B::Device) -> Result<SeqBatch<B>> {
        Ok(self.to_seq_batch(device)?)
    }
}

impl ToSeqBatch for Minibatch<i64> {
    fn to_batch<B: Backend>(&self, device: &B::Device) -> Result<SeqBatch<B>> {
        Ok(self.to_class_batch(device)?)
    }
}
