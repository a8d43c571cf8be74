//! Logistic win classifier
//!
//! A single linear unit over the game features; sigmoid of its output is the
//! probability that the subject team wins.

use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Linear model producing one win logit per row
#[derive(Module, Debug)]
pub struct WinClassifier<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> WinClassifier<B> {
    /// Create a classifier with all weights and the intercept at zero
    pub fn new(device: &B::Device, input_dim: usize) -> Self {
        WinClassifier {
            linear: LinearConfig::new(input_dim, 1)
                .with_initializer(Initializer::Zeros)
                .init(device),
        }
    }

    /// Win logits [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// Win probabilities [batch, 1]
    pub fn predict_proba(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.forward(features))
    }

    /// Weight column [input_dim, 1]
    pub fn weight(&self) -> Tensor<B, 2> {
        self.linear.weight.val()
    }

    /// Move the weights and intercept against their gradients by `step`
    pub fn descend(mut self, weight_grad: Tensor<B, 2>, bias_grad: Tensor<B, 1>, step: f64) -> Self {
        self.linear.weight = self
            .linear
            .weight
            .map(|w| w - weight_grad.clone().mul_scalar(step));
        self.linear.bias = self
            .linear
            .bias
            .map(|bias| bias.map(|b| b - bias_grad.clone().mul_scalar(step)));
        self
    }

    /// Feature weights in input order
    pub fn weights(&self) -> Vec<f64> {
        self.linear.weight.val().into_data().iter::<f64>().collect()
    }

    pub fn intercept(&self) -> f64 {
        self.linear
            .bias
            .as_ref()
            .and_then(|b| b.val().into_data().iter::<f64>().next())
            .unwrap_or(0.0)
    }
}
