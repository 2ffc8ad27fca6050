//! The model seam used by sequence tasks.

use burn::prelude::*;
use burn::tensor::activation::softmax;

/// A recurrent model mapping input sequences to output sequences.
///
/// Both tensors are time-major: the input is `(T, B, F)` and the output is
/// `(T, B, O)`, one output frame per input frame.
///
/// Any `Fn(Tensor<B, 3>) -> Tensor<B, 3>` is a model, which keeps tests and
/// small experiments free of module boilerplate.
pub trait SequenceModel<B: Backend> {
    /// Forward pass returning raw outputs.
    fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3>;

    /// Forward pass followed by a softmax over the output axis, giving
    /// per-step class probabilities.
    fn forward_probs(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        softmax(self.forward(x), 2)
    }
}

impl<B, F> SequenceModel<B> for F
where
    B: Backend,
    F: Fn(Tensor<B, 3>) -> Tensor<B, 3>,
{
    fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self(x)
    }
}
