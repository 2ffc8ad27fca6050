//! Recurrent task variants.
//!
//! A task declares the named inputs one training step consumes and turns
//! model output into a scalar loss. The four variants are siblings of one
//! enum, [`Task`], built from a serializable [`TaskConfig`].
//!
//! # Example
//!
//! ```rust
//! use burn::prelude::*;
//! use burn_ndarray::NdArray;
//! use recur_core::SeqBatch;
//! use recur_train::TaskConfig;
//!
//! let device = Default::default();
//! let task = TaskConfig::autoencoder().init::<NdArray>();
//! let batch = SeqBatch::new(Tensor::<NdArray, 3>::ones([5, 2, 3], &device));
//!
//! let identity = |x: Tensor<NdArray, 3>| x;
//! let loss: f32 = task.loss(&identity, &batch).unwrap().into_scalar().elem();
//! assert!(loss.abs() < 1e-6);
//! ```

use std::fmt;
use std::sync::Arc;

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};
use crate::inputs::{check_inputs, sequence_inputs, InputSpec, ToSeqBatch};
use crate::losses::{NextStepLoss, SequenceNllLoss, WeightedMseLoss};
use crate::metrics::{Metric, SequenceAccuracy};
use recur_core::{SeqBatch, SeqTarget, SeqWeights, SequenceModel};

/// The four task variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Reconstruct the input sequence.
    Autoencoder,
    /// Predict the next input frame.
    Predictor,
    /// Regress continuous targets.
    Regressor,
    /// Classify every time step.
    Classifier,
}

impl TaskKind {
    /// Lower-case name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Autoencoder => "autoencoder",
            TaskKind::Predictor => "predictor",
            TaskKind::Regressor => "regressor",
            TaskKind::Classifier => "classifier",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration of a task variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Which variant to build.
    pub kind: TaskKind,
    /// Whether the loss consumes a weight input.
    #[serde(default)]
    pub weighted: bool,
}

impl TaskConfig {
    /// Unweighted configuration of `kind`.
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            weighted: false,
        }
    }

    /// Autoencoder configuration.
    pub fn autoencoder() -> Self {
        Self::new(TaskKind::Autoencoder)
    }

    /// Predictor configuration.
    pub fn predictor() -> Self {
        Self::new(TaskKind::Predictor)
    }

    /// Regressor configuration.
    pub fn regressor() -> Self {
        Self::new(TaskKind::Regressor)
    }

    /// Classifier configuration.
    pub fn classifier() -> Self {
        Self::new(TaskKind::Classifier)
    }

    /// Set whether the loss is weighted.
    #[must_use]
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    /// Input declarations of the configured variant.
    pub fn inputs(&self) -> Vec<InputSpec> {
        match self.kind {
            TaskKind::Autoencoder => AutoencoderTask::new(self.weighted).inputs(),
            TaskKind::Predictor => sequence_inputs(self.weighted, None, 3),
            TaskKind::Regressor => RegressorTask::new(self.weighted).inputs(),
            TaskKind::Classifier => ClassifierTask::new(self.weighted).inputs(),
        }
    }

    /// Build the task.
    pub fn init<B: Backend>(&self) -> Task<B> {
        tracing::debug!(kind = %self.kind, weighted = self.weighted, "Building task");
        match self.kind {
            TaskKind::Autoencoder => Task::Autoencoder(AutoencoderTask::new(self.weighted)),
            TaskKind::Predictor => Task::Predictor(PredictorTask::new(self.weighted)),
            TaskKind::Regressor => Task::Regressor(RegressorTask::new(self.weighted)),
            TaskKind::Classifier => Task::Classifier(ClassifierTask::new(self.weighted)),
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::autoencoder()
    }
}

/// Behaviour shared by the task variants.
pub trait SequenceTask<B: Backend> {
    /// Variant of this task.
    fn kind(&self) -> TaskKind;

    /// Named inputs a training step consumes: `x`, then the target input,
    /// then `weights` when weighted.
    fn inputs(&self) -> Vec<InputSpec>;

    /// Scalar loss of `output` on `batch`.
    ///
    /// # Errors
    ///
    /// Fails when a declared input is missing or shapes disagree.
    fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>>;

    /// Check that `batch` supplies every declared input.
    ///
    /// # Errors
    ///
    /// [`TrainError::MissingInput`] or [`TrainError::InvalidInput`].
    fn check_batch(&self, batch: &SeqBatch<B>) -> Result<()> {
        check_inputs(self.kind().name(), &self.inputs(), batch)
    }
}

fn elementwise_weights<B: Backend>(
    weighted: bool,
    batch: &SeqBatch<B>,
    task: &'static str,
) -> Result<Option<Tensor<B, 3>>> {
    if !weighted {
        return Ok(None);
    }
    match batch.weights {
        Some(SeqWeights::Elementwise(ref w)) => Ok(Some(w.clone())),
        Some(SeqWeights::PerStep(_)) => Err(TrainError::InvalidInput(format!(
            "{} task expects elementwise weights",
            task
        ))),
        None => Err(TrainError::MissingInput {
            name: "weights",
            task,
        }),
    }
}

/// Reconstruct the inputs: `err = output - x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoencoderTask {
    weighted: bool,
}

impl AutoencoderTask {
    /// Create the task.
    pub fn new(weighted: bool) -> Self {
        Self { weighted }
    }

    /// Whether the loss is weighted.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// `x`, plus rank-3 `weights` when weighted.
    pub fn inputs(&self) -> Vec<InputSpec> {
        sequence_inputs(self.weighted, None, 3)
    }
}

impl<B: Backend> SequenceTask<B> for AutoencoderTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Autoencoder
    }

    fn inputs(&self) -> Vec<InputSpec> {
        AutoencoderTask::inputs(self)
    }

    fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        let weights = elementwise_weights(self.weighted, batch, "autoencoder")?;
        WeightedMseLoss::new().forward(output, batch.x.clone(), weights)
    }
}

/// Transform applied to model output before scoring it as a prediction.
pub type PredictionFn<B> = Arc<dyn Fn(Tensor<B, 3>) -> Tensor<B, 3> + Send + Sync>;

/// Predict the next input frame: `err = x[1..] - predict(output)[..T-1]`.
pub struct PredictorTask<B: Backend> {
    weighted: bool,
    prediction: PredictionFn<B>,
}

impl<B: Backend> PredictorTask<B> {
    /// Create the task with the identity prediction transform.
    pub fn new(weighted: bool) -> Self {
        Self {
            weighted,
            prediction: Arc::new(|output| output),
        }
    }

    /// Replace the transform mapping model output to predicted inputs.
    #[must_use]
    pub fn with_prediction<F>(mut self, prediction: F) -> Self
    where
        F: Fn(Tensor<B, 3>) -> Tensor<B, 3> + Send + Sync + 'static,
    {
        self.prediction = Arc::new(prediction);
        self
    }

    /// Apply the prediction transform.
    pub fn generate_prediction(&self, output: Tensor<B, 3>) -> Tensor<B, 3> {
        (self.prediction)(output)
    }

    /// Whether the loss is weighted.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }
}

impl<B: Backend> Clone for PredictorTask<B> {
    fn clone(&self) -> Self {
        Self {
            weighted: self.weighted,
            prediction: Arc::clone(&self.prediction),
        }
    }
}

impl<B: Backend> fmt::Debug for PredictorTask<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorTask")
            .field("weighted", &self.weighted)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> SequenceTask<B> for PredictorTask<B> {
    fn kind(&self) -> TaskKind {
        TaskKind::Predictor
    }

    fn inputs(&self) -> Vec<InputSpec> {
        sequence_inputs(self.weighted, None, 3)
    }

    fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        let weights = elementwise_weights(self.weighted, batch, "predictor")?;
        let predictions = self.generate_prediction(output);
        NextStepLoss::new().forward(batch.x.clone(), predictions, weights)
    }
}

/// Regress continuous targets: `err = output - targets`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegressorTask {
    weighted: bool,
}

impl RegressorTask {
    /// Create the task.
    pub fn new(weighted: bool) -> Self {
        Self { weighted }
    }

    /// Whether the loss is weighted.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// `x`, `targets`, plus rank-3 `weights` when weighted.
    pub fn inputs(&self) -> Vec<InputSpec> {
        sequence_inputs(self.weighted, Some(InputSpec::targets()), 3)
    }
}

impl<B: Backend> SequenceTask<B> for RegressorTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Regressor
    }

    fn inputs(&self) -> Vec<InputSpec> {
        RegressorTask::inputs(self)
    }

    fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        let targets = match batch.target {
            Some(SeqTarget::Values(ref t)) => t.clone(),
            Some(SeqTarget::Classes(_)) => {
                return Err(TrainError::InvalidInput(
                    "regressor task expects float targets, got classes".into(),
                ))
            }
            None => {
                return Err(TrainError::MissingInput {
                    name: "targets",
                    task: "regressor",
                })
            }
        };
        let weights = elementwise_weights(self.weighted, batch, "regressor")?;
        WeightedMseLoss::new().forward(output, targets, weights)
    }
}

/// Classify every time step.
///
/// The model output is read as per-step class probabilities `(T, B, C)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierTask {
    weighted: bool,
}

impl ClassifierTask {
    /// Create the task.
    pub fn new(weighted: bool) -> Self {
        Self { weighted }
    }

    /// Whether the loss is weighted.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// `x`, `labels`, plus rank-2 `weights` when weighted.
    pub fn inputs(&self) -> Vec<InputSpec> {
        sequence_inputs(self.weighted, Some(InputSpec::labels()), 2)
    }

    /// Most likely class per time step and batch slot, shape `(T, B)`.
    pub fn classify<B: Backend>(&self, output: Tensor<B, 3>) -> Tensor<B, 2, Int> {
        let [time, batch, _] = output.dims();
        output.argmax(2).reshape([time, batch])
    }

    /// Fraction of positions classified correctly, weighted by per-step
    /// weights when the task is weighted.
    ///
    /// # Errors
    ///
    /// Fails when the batch has no class labels or they are misaligned.
    pub fn accuracy<B: Backend>(&self, output: &Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<f32> {
        SequenceAccuracy::new(self.weighted).compute(output, batch)
    }
}

impl<B: Backend> SequenceTask<B> for ClassifierTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Classifier
    }

    fn inputs(&self) -> Vec<InputSpec> {
        ClassifierTask::inputs(self)
    }

    fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        let labels = match batch.target {
            Some(SeqTarget::Classes(ref l)) => l.clone(),
            Some(SeqTarget::Values(_)) => {
                return Err(TrainError::InvalidInput(
                    "classifier task expects class labels, got values".into(),
                ))
            }
            None => {
                return Err(TrainError::MissingInput {
                    name: "labels",
                    task: "classifier",
                })
            }
        };
        let weights = if self.weighted {
            match batch.weights {
                Some(SeqWeights::PerStep(ref w)) => Some(w.clone()),
                Some(SeqWeights::Elementwise(_)) => {
                    return Err(TrainError::InvalidInput(
                        "classifier task expects per-step weights".into(),
                    ))
                }
                None => {
                    return Err(TrainError::MissingInput {
                        name: "weights",
                        task: "classifier",
                    })
                }
            }
        } else {
            None
        };
        SequenceNllLoss::new().forward(output, labels, weights)
    }
}

/// A task variant ready to score batches.
#[derive(Debug, Clone)]
pub enum Task<B: Backend> {
    /// Reconstruction.
    Autoencoder(AutoencoderTask),
    /// Next-step prediction.
    Predictor(PredictorTask<B>),
    /// Regression.
    Regressor(RegressorTask),
    /// Per-step classification.
    Classifier(ClassifierTask),
}

impl<B: Backend> Task<B> {
    fn as_task(&self) -> &dyn SequenceTask<B> {
        match self {
            Task::Autoencoder(t) => t,
            Task::Predictor(t) => t,
            Task::Regressor(t) => t,
            Task::Classifier(t) => t,
        }
    }

    /// Variant of this task.
    pub fn kind(&self) -> TaskKind {
        self.as_task().kind()
    }

    /// Whether the loss consumes weights.
    pub fn is_weighted(&self) -> bool {
        match self {
            Task::Autoencoder(t) => t.is_weighted(),
            Task::Predictor(t) => t.is_weighted(),
            Task::Regressor(t) => t.is_weighted(),
            Task::Classifier(t) => t.is_weighted(),
        }
    }

    /// Named input declarations.
    pub fn inputs(&self) -> Vec<InputSpec> {
        self.as_task().inputs()
    }

    /// Check that `batch` supplies every declared input.
    ///
    /// # Errors
    ///
    /// [`TrainError::MissingInput`] or [`TrainError::InvalidInput`].
    pub fn check_batch(&self, batch: &SeqBatch<B>) -> Result<()> {
        self.as_task().check_batch(batch)
    }

    /// Scalar loss of an already computed `output`.
    ///
    /// # Errors
    ///
    /// Fails when a declared input is missing or shapes disagree.
    pub fn error(&self, output: Tensor<B, 3>, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        self.as_task().error(output, batch)
    }

    /// Run `model` on `batch.x` and score the output.
    ///
    /// # Errors
    ///
    /// Fails before the forward pass when the batch does not match the
    /// declared inputs, and afterwards when shapes disagree.
    pub fn loss<M: SequenceModel<B>>(&self, model: &M, batch: &SeqBatch<B>) -> Result<Tensor<B, 1>> {
        self.check_batch(batch)?;
        let output = model.forward(batch.x.clone());
        self.error(output, batch)
    }

    /// Convert a sampled minibatch and check it against the declared
    /// inputs.
    ///
    /// # Errors
    ///
    /// [`TrainError::DataError`] when the minibatch cannot be converted,
    /// otherwise as [`check_batch`](Self::check_batch).
    pub fn prepare<T: ToSeqBatch>(&self, minibatch: &T, device: &B::Device) -> Result<SeqBatch<B>> {
        let batch = minibatch.to_batch::<B>(device)?;
        self.check_batch(&batch)?;
        Ok(batch)
    }

    /// [`prepare`](Self::prepare) a minibatch, then compute its
    /// [`loss`](Self::loss).
    ///
    /// # Errors
    ///
    /// As [`prepare`](Self::prepare) and [`loss`](Self::loss).
    pub fn minibatch_loss<M, T>(
        &self,
        model: &M,
        minibatch: &T,
        device: &B::Device,
    ) -> Result<Tensor<B, 1>>
    where
        M: SequenceModel<B>,
        T: ToSeqBatch,
    {
        let batch = self.prepare(minibatch, device)?;
        let output = model.forward(batch.x.clone());
        self.error(output, &batch)
    }

    /// Replace the prediction transform of a predictor task.
    ///
    /// # Errors
    ///
    /// [`TrainError::InvalidInput`] for any other variant.
    pub fn with_prediction<F>(self, prediction: F) -> Result<Self>
    where
        F: Fn(Tensor<B, 3>) -> Tensor<B, 3> + Send + Sync + 'static,
    {
        match self {
            Task::Predictor(t) => Ok(Task::Predictor(t.with_prediction(prediction))),
            other => Err(TrainError::InvalidInput(format!(
                "{} task has no prediction transform",
                other.kind()
            ))),
        }
    }
}
