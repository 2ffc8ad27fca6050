//! Integration tests for the sampling-to-loss pipeline.
//!
//! These tests draw minibatches from synthetic series, convert them to
//! tensors and evaluate every task variant on them.

use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::softmax;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use ndarray::{Array2, Axis};

use recur::prelude::*;
use recur::train::TrainError;

type TestBackend = NdArray;
type TrainBackend = Autodiff<NdArray>;

/// A sine series with two features and a class label that flips each
/// half period.
fn create_synthetic_series(len: usize) -> (Array2<f32>, Array2<i64>) {
    let series = Array2::from_shape_fn((len, 2), |(t, f)| {
        let phase = t as f32 * 0.2 + f as f32;
        phase.sin()
    });
    let labels = Array2::from_shape_fn((len, 1), |(t, _)| ((t as f32 * 0.2).sin() > 0.0) as i64);
    (series, labels)
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f32 {
    t.into_scalar().elem()
}

#[test]
fn test_ramp_scenario() {
    let series = Array2::from_shape_fn((10, 1), |(t, _)| t as f32);
    let mut next_batch = batches::<f32>(series, None, 3, 2, Seed::new(7)).unwrap();

    for _ in 0..50 {
        let arrays = next_batch().into_arrays();
        assert_eq!(arrays.len(), 1);
        let x = &arrays[0];
        assert_eq!(x.dim(), (3, 2, 1));
        for column in x.axis_iter(Axis(1)) {
            let start = column[[0, 0]];
            assert!((0.0..=6.0).contains(&start));
            assert_eq!(column[[1, 0]], start + 1.0);
            assert_eq!(column[[2, 0]], start + 2.0);
        }
    }
}

#[test]
fn test_autoencoder_on_sampled_batches() {
    let (series, _) = create_synthetic_series(200);
    let mut sampler = WindowSampler::builder(series)
        .steps(20)
        .batch_size(4)
        .seed(Seed::new(42))
        .build()
        .unwrap();
    let device = Default::default();
    let task = TaskConfig::autoencoder().init::<TestBackend>();
    let identity = |x: Tensor<TestBackend, 3>| x;

    for batch in sampler.by_ref().take(5) {
        let batch = batch.to_seq_batch::<TestBackend>(&device).unwrap();
        assert_eq!(batch.shape(), SeqShape::new(20, 4, 2));
        assert!(scalar(task.loss(&identity, &batch).unwrap()) < 1e-10);
    }
}

#[test]
fn test_predictor_with_loader() {
    let series = Array2::from_shape_fn((60, 1), |(t, _)| t as f32);
    let sampler = WindowSampler::builder(series)
        .steps(8)
        .batch_size(3)
        .seed(Seed::new(3))
        .build()
        .unwrap();
    let mut loader = EpochLoader::new(sampler, 4).unwrap();
    let device = Default::default();
    let task = TaskConfig::predictor().init::<TestBackend>();
    let next_value = |x: Tensor<TestBackend, 3>| x + 1.0;

    for _ in 0..2 {
        let mut seen = 0;
        for batch in loader.epoch() {
            let batch = batch.to_seq_batch::<TestBackend>(&device).unwrap();
            assert!(scalar(task.loss(&next_value, &batch).unwrap()) < 1e-10);
            seen += 1;
        }
        assert_eq!(seen, 4);
    }
    assert_eq!(loader.epochs_started(), 2);
}

#[test]
fn test_regressor_targets_are_aligned() {
    let series = Array2::from_shape_fn((50, 1), |(t, _)| t as f32);
    let targets = Array2::from_shape_fn((50, 1), |(t, _)| t as f32 * 2.0);
    let mut sampler = WindowSampler::builder(series)
        .labels(targets)
        .steps(5)
        .batch_size(6)
        .seed(Seed::new(11))
        .build()
        .unwrap();
    let device = Default::default();
    let task = TaskConfig::regressor().init::<TestBackend>();
    let double = |x: Tensor<TestBackend, 3>| x * 2.0;

    let batch = sampler.sample().to_seq_batch::<TestBackend>(&device).unwrap();
    assert!(scalar(task.loss(&double, &batch).unwrap()) < 1e-10);
}

#[test]
fn test_classifier_on_sampled_batches() {
    let (series, labels) = create_synthetic_series(120);
    let mut sampler = WindowSampler::builder(series)
        .labels(labels)
        .steps(10)
        .batch_size(5)
        .seed(Seed::new(5))
        .build()
        .unwrap();
    let device = Default::default();
    let task = TaskConfig::classifier().init::<TestBackend>();
    let uniform = |x: Tensor<TestBackend, 3>| {
        let [t, b, _] = x.dims();
        Tensor::<TestBackend, 3>::ones([t, b, 2], &x.device()) * 0.5
    };

    let batch = sampler.sample().to_class_batch::<TestBackend>(&device).unwrap();
    let loss = scalar(task.loss(&uniform, &batch).unwrap());
    assert!((loss - std::f32::consts::LN_2).abs() < 1e-5);
}

#[test]
fn test_missing_labels_are_reported() {
    let (series, _) = create_synthetic_series(40);
    let mut sampler = WindowSampler::builder(series)
        .steps(10)
        .batch_size(2)
        .seed(Seed::new(1))
        .build()
        .unwrap();
    let device = Default::default();
    let batch = sampler.sample().to_seq_batch::<TestBackend>(&device).unwrap();
    let identity = |x: Tensor<TestBackend, 3>| x;

    let task = TaskConfig::classifier().init::<TestBackend>();
    assert!(matches!(
        task.loss(&identity, &batch),
        Err(TrainError::MissingInput { name: "labels", .. })
    ));
}

#[test]
fn test_classifier_loss_backpropagates() {
    let (series, labels) = create_synthetic_series(80);
    let mut sampler = WindowSampler::builder(series)
        .labels(labels)
        .steps(12)
        .batch_size(4)
        .seed(Seed::new(9))
        .build()
        .unwrap();
    let device = Default::default();
    let batch = sampler.sample().to_class_batch::<TrainBackend>(&device).unwrap();

    let linear: Linear<TrainBackend> = LinearConfig::new(2, 2).init(&device);
    let model = |x: Tensor<TrainBackend, 3>| softmax(linear.forward(x), 2);

    let task = TaskConfig::classifier().init::<TrainBackend>();
    let loss = task.loss(&model, &batch).unwrap();
    let value = loss.clone().into_scalar().elem::<f32>();
    assert!(value.is_finite() && value > 0.0);

    let grads = loss.backward();
    let grad = linear.weight.val().grad(&grads).unwrap();
    assert_eq!(grad.dims(), [2, 2]);
    let magnitude: f32 = grad.abs().sum().into_scalar().elem();
    assert!(magnitude > 0.0);
}

#[test]
fn test_weighted_predictor_backpropagates() {
    let series = Array2::from_shape_fn((40, 1), |(t, _)| (t as f32 * 0.3).cos());
    let mut sampler = WindowSampler::builder(series)
        .steps(6)
        .batch_size(3)
        .seed(Seed::new(21))
        .build()
        .unwrap();
    let device = Default::default();
    let batch = sampler
        .sample()
        .to_seq_batch::<TrainBackend>(&device)
        .unwrap()
        .with_weights(SeqWeights::Elementwise(Tensor::ones([6, 3, 1], &device)))
        .unwrap();

    let linear: Linear<TrainBackend> = LinearConfig::new(1, 1).init(&device);
    let model = |x: Tensor<TrainBackend, 3>| linear.forward(x);

    let task = TaskConfig::predictor().with_weighted(true).init::<TrainBackend>();
    let grads = task.loss(&model, &batch).unwrap().backward();
    assert!(linear.weight.val().grad(&grads).is_some());
}

#[test]
fn test_parallel_workers_draw_independent_batches() {
    let (series, _) = create_synthetic_series(500);
    let base = Seed::new(42);
    let config = |i| SamplerConfig::new(16, 4).with_seed(base.for_worker(i));

    let mut first = WindowSampler::<f32>::from_config(series.clone(), None, &config(0)).unwrap();
    let mut second = WindowSampler::<f32>::from_config(series.clone(), None, &config(1)).unwrap();
    let mut again = WindowSampler::<f32>::from_config(series, None, &config(0)).unwrap();

    let a = first.sample();
    let b = second.sample();
    let c = again.sample();
    assert_eq!(a.offsets, c.offsets);
    assert_ne!(a.offsets, b.offsets);
}
