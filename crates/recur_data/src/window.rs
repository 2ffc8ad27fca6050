//! Random windowed minibatches from a single long time series.

use std::fmt::Debug;

use ndarray::{s, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::sampler::{OffsetSampler, UniformOffsets};
use recur_core::{Seed, SeqShape};

/// Default window length.
pub const DEFAULT_STEPS: usize = 100;

/// Default number of windows per minibatch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Serializable sampler settings.
///
/// # Example
///
/// ```rust
/// use recur_data::SamplerConfig;
/// use recur_core::Seed;
///
/// let config = SamplerConfig::new(30, 16).with_seed(Seed::new(1));
/// assert_eq!(config.steps, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Window length in time steps.
    pub steps: usize,
    /// Windows per minibatch.
    pub batch_size: usize,
    /// Seed for the offset generator. `None` draws one from entropy.
    pub seed: Option<Seed>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl SamplerConfig {
    /// Create a config with the given window length and batch size.
    #[must_use]
    pub fn new(steps: usize, batch_size: usize) -> Self {
        Self {
            steps,
            batch_size,
            ..Default::default()
        }
    }

    /// Fix the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One sampled minibatch.
///
/// `inputs` has shape `(steps, batch_size, n_features)`. In labeled mode
/// `labels` has shape `(steps, batch_size, label_width)` and slot `i` of
/// both arrays was cut at the same start offset `offsets[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Minibatch<L = f32> {
    /// Input windows, time-major.
    pub inputs: Array3<f32>,
    /// Label windows, present in labeled mode.
    pub labels: Option<Array3<L>>,
    /// Start offset of the window in each batch slot.
    pub offsets: Vec<usize>,
}

impl<L> Minibatch<L> {
    /// Number of arrays this minibatch feeds a training step: 1 unlabeled,
    /// 2 labeled.
    #[must_use]
    pub fn arity(&self) -> usize {
        if self.labels.is_some() {
            2
        } else {
            1
        }
    }

    /// Whether labels were sampled.
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.labels.is_some()
    }

    /// Shape of the input windows.
    #[must_use]
    pub fn shape(&self) -> SeqShape {
        let dims = self.inputs.dim();
        SeqShape::from(dims)
    }
}

impl Minibatch<f32> {
    /// Flatten into the `[inputs]` or `[inputs, labels]` sequence a
    /// training loop consumes.
    #[must_use]
    pub fn into_arrays(self) -> Vec<Array3<f32>> {
        let mut arrays = Vec::with_capacity(self.arity());
        arrays.push(self.inputs);
        arrays.extend(self.labels);
        arrays
    }
}

impl Minibatch<i64> {
    /// Per-step class indices `(steps, batch_size)`.
    ///
    /// # Errors
    ///
    /// Fails if the minibatch is unlabeled or the labels are wider than one
    /// column.
    pub fn class_indices(&self) -> Result<Array2<i64>> {
        let labels = self.labels.as_ref().ok_or_else(|| {
            DataError::InvalidInput("minibatch was sampled without labels".to_string())
        })?;
        let width = labels.len_of(Axis(2));
        if width != 1 {
            return Err(DataError::InvalidShape(format!(
                "class labels must have width 1, got {}",
                width
            )));
        }
        Ok(labels.index_axis(Axis(2), 0).to_owned())
    }
}

/// Draws fixed-length windows at random offsets from a series.
///
/// Rows of `series` are time steps and columns are features. Each call to
/// [`sample`](Self::sample) fills `batch_size` slots; slot `i` receives
/// `series[j..j + steps]` for an offset `j` in `0..len - steps`. Draws are
/// independent, so windows may overlap or repeat.
///
/// Whether labels are sampled is decided once, at construction.
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use recur_core::Seed;
/// use recur_data::WindowSampler;
///
/// let series = Array2::from_shape_fn((10, 1), |(t, _)| t as f32);
/// let mut sampler = WindowSampler::builder(series)
///     .steps(3)
///     .batch_size(2)
///     .seed(Seed::new(42))
///     .build()
///     .unwrap();
///
/// let batch = sampler.sample();
/// assert_eq!(batch.inputs.dim(), (3, 2, 1));
/// ```
#[derive(Debug)]
pub struct WindowSampler<L = f32> {
    series: Array2<f32>,
    labels: Option<Array2<L>>,
    steps: usize,
    batch_size: usize,
    offsets: Box<dyn OffsetSampler>,
}

impl WindowSampler<f32> {
    /// Start building a sampler over `series`.
    #[must_use]
    pub fn builder(series: Array2<f32>) -> WindowSamplerBuilder<f32> {
        WindowSamplerBuilder::new(series)
    }
}

impl<L> WindowSampler<L>
where
    L: Clone + Default,
{
    /// Build a sampler from a [`SamplerConfig`].
    ///
    /// # Errors
    ///
    /// See [`WindowSamplerBuilder::build`].
    pub fn from_config(
        series: Array2<f32>,
        labels: Option<Array2<L>>,
        config: &SamplerConfig,
    ) -> Result<Self> {
        let builder = WindowSamplerBuilder {
            series,
            labels,
            steps: config.steps,
            batch_size: config.batch_size,
            seed: config.seed,
            offsets: None,
        };
        builder.build()
    }

    /// Draw one minibatch.
    pub fn sample(&mut self) -> Minibatch<L> {
        let n_windows = self.n_windows();
        let mut inputs = Array3::<f32>::zeros((self.steps, self.batch_size, self.n_features()));
        let mut labels = self
            .labels
            .as_ref()
            .map(|l| Array3::from_elem((self.steps, self.batch_size, l.ncols()), L::default()));
        let mut offsets = Vec::with_capacity(self.batch_size);

        for i in 0..self.batch_size {
            let j = self.offsets.draw(n_windows);
            let end = j + self.steps;

            inputs
                .index_axis_mut(Axis(1), i)
                .assign(&self.series.slice(s![j..end, ..]));

            if let (Some(out), Some(src)) = (labels.as_mut(), self.labels.as_ref()) {
                out.index_axis_mut(Axis(1), i)
                    .assign(&src.slice(s![j..end, ..]));
            }

            offsets.push(j);
        }

        Minibatch {
            inputs,
            labels,
            offsets,
        }
    }

    /// Turn the sampler into the zero-argument callable a training loop
    /// polls for minibatches.
    pub fn into_fn(mut self) -> impl FnMut() -> Minibatch<L> {
        move || self.sample()
    }
}

impl<L> WindowSampler<L> {
    /// Window length.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Windows per minibatch.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of series features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.series.ncols()
    }

    /// Number of label columns, if labeled.
    #[must_use]
    pub fn label_width(&self) -> Option<usize> {
        self.labels.as_ref().map(Array2::ncols)
    }

    /// Whether the sampler produces labels.
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.labels.is_some()
    }

    /// Number of distinct start offsets, `len - steps`.
    #[must_use]
    pub fn n_windows(&self) -> usize {
        self.series.nrows() - self.steps
    }

    /// Shape of every minibatch this sampler produces.
    #[must_use]
    pub fn batch_shape(&self) -> SeqShape {
        SeqShape::new(self.steps, self.batch_size, self.n_features())
    }
}

impl<L> Iterator for WindowSampler<L>
where
    L: Clone + Default,
{
    type Item = Minibatch<L>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sample())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Builder for [`WindowSampler`].
#[derive(Debug)]
pub struct WindowSamplerBuilder<L = f32> {
    series: Array2<f32>,
    labels: Option<Array2<L>>,
    steps: usize,
    batch_size: usize,
    seed: Option<Seed>,
    offsets: Option<Box<dyn OffsetSampler>>,
}

impl WindowSamplerBuilder<f32> {
    /// Create a new builder with default window length and batch size.
    #[must_use]
    pub fn new(series: Array2<f32>) -> Self {
        Self {
            series,
            labels: None,
            steps: DEFAULT_STEPS,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            offsets: None,
        }
    }
}

impl<L> WindowSamplerBuilder<L> {
    /// Sample labels alongside the series. Rows must align with the series.
    #[must_use]
    pub fn labels<M>(self, labels: Array2<M>) -> WindowSamplerBuilder<M> {
        WindowSamplerBuilder {
            series: self.series,
            labels: Some(labels),
            steps: self.steps,
            batch_size: self.batch_size,
            seed: self.seed,
            offsets: self.offsets,
        }
    }

    /// Set the window length.
    #[must_use]
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the number of windows per minibatch.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Seed the default uniform offset generator.
    #[must_use]
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the offset strategy. Overrides [`seed`](Self::seed).
    #[must_use]
    pub fn offsets(mut self, offsets: impl OffsetSampler + 'static) -> Self {
        self.offsets = Some(Box::new(offsets));
        self
    }

    /// Validate the configuration and build the sampler.
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptySeries`] if the series has no rows or columns
    /// - [`DataError::InvalidBatchSize`] if `batch_size == 0`
    /// - [`DataError::InvalidWindowSize`] unless `0 < steps < len`
    /// - [`DataError::LengthMismatch`] if labels and series lengths differ
    /// - [`DataError::InvalidShape`] if labels have no columns
    pub fn build(self) -> Result<WindowSampler<L>> {
        let len = self.series.nrows();
        if len == 0 || self.series.ncols() == 0 {
            return Err(DataError::EmptySeries);
        }

        if self.batch_size == 0 {
            return Err(DataError::InvalidBatchSize(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.steps == 0 || self.steps >= len {
            return Err(DataError::InvalidWindowSize {
                steps: self.steps,
                len,
            });
        }

        if let Some(ref labels) = self.labels {
            if labels.nrows() != len {
                return Err(DataError::LengthMismatch {
                    series: len,
                    labels: labels.nrows(),
                });
            }
            if labels.ncols() == 0 {
                return Err(DataError::InvalidShape(
                    "labels must have at least one column".to_string(),
                ));
            }
        }

        let n_windows = len - self.steps;
        if self.batch_size > n_windows {
            tracing::warn!(
                "batch_size {} exceeds the {} distinct windows; every batch repeats windows",
                self.batch_size,
                n_windows
            );
        }
        tracing::debug!(
            "window sampler ready: steps={}, batch_size={}, windows={}, labeled={}",
            self.steps,
            self.batch_size,
            n_windows,
            self.labels.is_some()
        );

        let offsets = match (self.offsets, self.seed) {
            (Some(offsets), _) => offsets,
            (None, Some(seed)) => Box::new(UniformOffsets::new(seed)) as Box<dyn OffsetSampler>,
            (None, None) => Box::new(UniformOffsets::from_entropy()),
        };

        Ok(WindowSampler {
            series: self.series,
            labels: self.labels,
            steps: self.steps,
            batch_size: self.batch_size,
            offsets,
        })
    }
}

/// Build a zero-argument minibatch callable over a series.
///
/// Unlabeled minibatches carry only `inputs`; labeled ones also carry
/// `labels` cut at the same offsets.
///
/// # Errors
///
/// See [`WindowSamplerBuilder::build`].
///
/// # Example
///
/// ```rust
/// use ndarray::Array2;
/// use recur_core::Seed;
/// use recur_data::batches;
///
/// let series = Array2::from_shape_fn((50, 2), |(t, f)| (t * 2 + f) as f32);
/// let labels = Array2::from_shape_fn((50, 1), |(t, _)| (t % 3) as i64);
/// let mut next_batch = batches(series, Some(labels), 10, 4, Seed::new(0)).unwrap();
///
/// let batch = next_batch();
/// assert_eq!(batch.arity(), 2);
/// assert_eq!(batch.class_indices().unwrap().dim(), (10, 4));
/// ```
pub fn batches<L>(
    series: Array2<f32>,
    labels: Option<Array2<L>>,
    steps: usize,
    batch_size: usize,
    seed: Seed,
) -> Result<impl FnMut() -> Minibatch<L>>
where
    L: Clone + Default + Debug,
{
    let config = SamplerConfig::new(steps, batch_size).with_seed(seed);
    let sampler = WindowSampler::from_config(series, labels, &config)?;
    Ok(sampler.into_fn())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SequentialOffsets;

    fn ramp(len: usize) -> Array2<f32> {
        Array2::from_shape_fn((len, 1), |(t, _)| t as f32)
    }

    #[test]
    fn test_ten_step_scenario() {
        let mut sampler = WindowSampler::builder(ramp(10))
            .steps(3)
            .batch_size(2)
            .seed(Seed::new(42))
            .build()
            .unwrap();

        for _ in 0..50 {
            let batch = sampler.sample();
            assert_eq!(batch.inputs.dim(), (3, 2, 1));
            assert_eq!(batch.arity(), 1);
            for slot in 0..2 {
                let first = batch.inputs[[0, slot, 0]];
                assert!(first >= 0.0 && first <= 6.0);
                for t in 1..3 {
                    assert_eq!(batch.inputs[[t, slot, 0]], first + t as f32);
                }
            }
        }
    }

    #[test]
    fn test_offsets_within_bounds() {
        let mut sampler = WindowSampler::builder(ramp(20))
            .steps(5)
            .batch_size(16)
            .seed(Seed::new(7))
            .build()
            .unwrap();

        assert_eq!(sampler.n_windows(), 15);
        for _ in 0..20 {
            let batch = sampler.sample();
            assert_eq!(batch.offsets.len(), 16);
            for (slot, &j) in batch.offsets.iter().enumerate() {
                assert!(j < 15);
                assert_eq!(batch.inputs[[0, slot, 0]], j as f32);
            }
        }
    }

    #[test]
    fn test_labels_share_offsets() {
        let series = Array2::from_shape_fn((30, 2), |(t, f)| (t * 10 + f) as f32);
        let labels = Array2::from_shape_fn((30, 1), |(t, _)| -(t as f32));
        let mut sampler = WindowSampler::builder(series)
            .labels(labels)
            .steps(4)
            .batch_size(8)
            .seed(Seed::new(3))
            .build()
            .unwrap();

        let batch = sampler.sample();
        let labels = batch.labels.as_ref().unwrap();
        assert_eq!(labels.dim(), (4, 8, 1));
        for slot in 0..8 {
            for t in 0..4 {
                let step = batch.inputs[[t, slot, 0]] / 10.0;
                assert_eq!(labels[[t, slot, 0]], -step);
            }
        }
        assert_eq!(batch.clone().into_arrays().len(), 2);
    }

    #[test]
    fn test_same_seed_same_batches() {
        let build = || {
            WindowSampler::builder(ramp(100))
                .steps(10)
                .batch_size(4)
                .seed(Seed::new(11))
                .build()
                .unwrap()
        };
        let a: Vec<_> = build().take(5).collect();
        let b: Vec<_> = build().take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequential_offsets_strategy() {
        let mut sampler = WindowSampler::builder(ramp(8))
            .steps(2)
            .batch_size(4)
            .offsets(SequentialOffsets::new(2))
            .build()
            .unwrap();
        assert_eq!(sampler.sample().offsets, vec![0, 2, 4, 0]);
    }

    #[test]
    fn test_invalid_window_size() {
        for steps in [0, 10, 11] {
            let err = WindowSampler::builder(ramp(10)).steps(steps).build().unwrap_err();
            match err {
                DataError::InvalidWindowSize { steps: s, len } => {
                    assert_eq!(s, steps);
                    assert_eq!(len, 10);
                }
                other => panic!("expected InvalidWindowSize, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_batch_size() {
        let err = WindowSampler::builder(ramp(10))
            .steps(3)
            .batch_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidBatchSize(_)));
    }

    #[test]
    fn test_empty_series() {
        let err = WindowSampler::builder(Array2::zeros((0, 3)))
            .steps(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, DataError::EmptySeries));

        let err = WindowSampler::builder(Array2::zeros((5, 0)))
            .steps(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, DataError::EmptySeries));
    }

    #[test]
    fn test_label_length_mismatch() {
        let err = WindowSampler::builder(ramp(10))
            .labels(Array2::<i64>::zeros((9, 1)))
            .steps(3)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch {
                series: 10,
                labels: 9
            }
        ));
    }

    #[test]
    fn test_labels_without_columns() {
        let err = WindowSampler::builder(ramp(10))
            .labels(Array2::<f32>::zeros((10, 0)))
            .steps(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidShape(_)));
    }

    #[test]
    fn test_batch_larger_than_window_count() {
        // 3 distinct windows, 8 slots: builds, and windows must repeat
        let mut sampler = WindowSampler::builder(ramp(5))
            .steps(2)
            .batch_size(8)
            .seed(Seed::new(4))
            .build()
            .unwrap();
        assert_eq!(sampler.n_windows(), 3);

        let batch = sampler.sample();
        assert_eq!(batch.inputs.dim(), (2, 8, 1));
        let mut distinct = batch.offsets.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert!(distinct.len() <= 3);
        assert!(batch.offsets.iter().all(|&j| j < 3));
    }

    #[test]
    fn test_class_indices() {
        let labels = Array2::from_shape_fn((12, 1), |(t, _)| (t % 4) as i64);
        let mut next = batches(ramp(12), Some(labels), 4, 3, Seed::new(5)).unwrap();
        let batch = next();
        let classes = batch.class_indices().unwrap();
        assert_eq!(classes.dim(), (4, 3));
        for (slot, &j) in batch.offsets.iter().enumerate() {
            for t in 0..4 {
                assert_eq!(classes[[t, slot]], ((j + t) % 4) as i64);
            }
        }
    }

    #[test]
    fn test_class_indices_requires_width_one() {
        let labels = Array2::<i64>::zeros((12, 2));
        let mut next = batches(ramp(12), Some(labels), 4, 3, Seed::new(5)).unwrap();
        assert!(matches!(
            next().class_indices(),
            Err(DataError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = SamplerConfig::new(4, 2).with_seed(Seed::new(1));
        let sampler = WindowSampler::<f32>::from_config(ramp(10), None, &config).unwrap();
        assert_eq!(sampler.steps(), 4);
        assert_eq!(sampler.batch_size(), 2);
        assert_eq!(sampler.batch_shape(), SeqShape::new(4, 2, 1));
        assert!(!sampler.is_labeled());
        assert_eq!(sampler.label_width(), None);
    }

    #[test]
    fn test_config_defaults_and_serde() {
        let config = SamplerConfig::default();
        assert_eq!(config.steps, DEFAULT_STEPS);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.seed.is_none());

        let parsed: SamplerConfig = serde_json::from_str(r#"{"steps": 12}"#).unwrap();
        assert_eq!(parsed.steps, 12);
        assert_eq!(parsed.batch_size, DEFAULT_BATCH_SIZE);

        let seeded = SamplerConfig::new(5, 2).with_seed(Seed::new(9));
        let json = serde_json::to_string(&seeded).unwrap();
        let restored: SamplerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(seeded, restored);
    }
}
