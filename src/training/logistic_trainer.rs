//! Full-batch trainer for the logistic win classifier
//!
//! Minimizes mean binary cross-entropy plus an L2 penalty on the weights,
//! scaled so that `c` plays the role of an inverse regularization strength.
//! The gradient is written out rather than traced, and every sum over rows is
//! a matrix product, so a fit on the same rows always takes the same steps and
//! lands on the same coefficients.

use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

use crate::features::FeatureRow;
use crate::model::WinClassifier;
use crate::training::dataset::{FeatureBatcher, FeatureNormalization};
use crate::{ModelConfig, MoneylineError, Result};

const PROB_EPS: f64 = 1e-7;

/// A trained classifier with the normalization it was fitted under
#[derive(Debug)]
pub struct FittedClassifier<B: Backend> {
    model: WinClassifier<B>,
    norm: FeatureNormalization,
    device: B::Device,
    /// Gradient steps taken
    pub iterations: usize,
    /// Whether the loss settled within tolerance before the iteration cap
    pub converged: bool,
    /// Regularized loss at the last step
    pub final_loss: f64,
}

impl<B: Backend> FittedClassifier<B> {
    /// Win probability for each row, in row order
    pub fn predict(&self, rows: &[FeatureRow]) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }

        let batch = FeatureBatcher::<B>::new(self.device.clone()).batch(rows.to_vec(), &self.device);
        let features = self.norm.normalize(batch.features);

        self.model
            .predict_proba(features)
            .into_data()
            .iter::<f64>()
            .collect()
    }

    /// Weights in normalized feature space, `FEATURE_COLUMNS` order
    pub fn coefficients(&self) -> Vec<f64> {
        self.model.weights()
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept()
    }
}

/// Gradient descent trainer for `WinClassifier`
pub struct LogisticTrainer<B: Backend> {
    model: WinClassifier<B>,
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    device: B::Device,
}

impl<B: Backend> LogisticTrainer<B> {
    /// Create a trainer with a zero-initialized model
    pub fn new(device: B::Device, config: &ModelConfig) -> Self {
        LogisticTrainer {
            model: WinClassifier::new(&device, FeatureRow::DIM),
            c: config.c,
            learning_rate: config.learning_rate,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            device,
        }
    }

    /// Step size that cannot overshoot.
    ///
    /// Standardized columns have unit mean square, so the cross-entropy
    /// Hessian over weights and intercept is bounded by a quarter of the
    /// column count plus one. The penalty adds `ridge`.
    fn step_size(&self, ridge: f64) -> f64 {
        let curvature = 0.25 * (FeatureRow::DIM + 1) as f64 + ridge;
        self.learning_rate.min(1.0 / curvature)
    }

    /// Fit on labelled rows
    pub fn fit(mut self, rows: &[FeatureRow]) -> Result<FittedClassifier<B>> {
        if rows.is_empty() {
            return Err(MoneylineError::InsufficientRows {
                rows: 0,
                required: 2,
            });
        }
        let wins = rows.iter().filter(|r| r.won).count();
        if wins == 0 || wins == rows.len() {
            return Err(MoneylineError::DegenerateLabels { rows: rows.len() });
        }
        if self.c <= 0.0 || self.learning_rate <= 0.0 {
            return Err(MoneylineError::Config(format!(
                "model.c and model.learning_rate must be positive, got {} and {}",
                self.c, self.learning_rate
            )));
        }

        let norm = FeatureNormalization::from_rows(rows);
        log::debug!(
            "Feature normalization: mean={:?}, std={:?}",
            norm.mean,
            norm.std
        );

        let n = rows.len() as f64;
        let batch = FeatureBatcher::<B>::new(self.device.clone()).batch(rows.to_vec(), &self.device);
        let x = norm.normalize(batch.features);
        let x_t = x.clone().transpose();
        let y: Tensor<B, 2> = batch.labels.unsqueeze_dim(1);
        let ones = Tensor::<B, 2>::ones([1, rows.len()], &self.device);

        let ridge = 1.0 / (self.c * n);
        let step = self.step_size(ridge);

        log::info!(
            "Fitting logistic model on {} rows ({} wins), C={}, step={:.4}",
            rows.len(),
            wins,
            self.c,
            step
        );

        let mut previous = f64::INFINITY;
        let mut final_loss = f64::INFINITY;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            let probs = self.model.predict_proba(x.clone());
            let weight = self.model.weight();

            let loss_val = mean_cross_entropy(&ones, probs.clone(), y.clone(), n)
                + 0.5 * ridge * squared_norm(weight.clone());
            if !loss_val.is_finite() {
                return Err(MoneylineError::Diverged {
                    iteration: iterations,
                });
            }

            // d/dw = Xᵀ(p - y)/n + w/(Cn), d/db = mean(p - y)
            let residual = probs - y.clone();
            let weight_grad = x_t.clone().matmul(residual.clone()).div_scalar(n)
                + weight.mul_scalar(ridge);
            let bias_grad = ones.clone().matmul(residual).div_scalar(n).reshape([1]);
            self.model = self.model.descend(weight_grad, bias_grad, step);

            iterations += 1;
            final_loss = loss_val;

            if (previous - loss_val).abs() < self.tolerance {
                converged = true;
                break;
            }
            previous = loss_val;

            if iterations % 10_000 == 0 {
                log::debug!("Iteration {}: loss={:.6}", iterations, loss_val);
            }
        }

        if converged {
            log::info!("Converged after {} iterations, loss={:.6}", iterations, final_loss);
        } else {
            log::warn!(
                "Stopped at max_iter={} without converging, loss={:.6}",
                self.max_iter,
                final_loss
            );
        }

        Ok(FittedClassifier {
            model: self.model,
            norm,
            device: self.device.clone(),
            iterations,
            converged,
            final_loss,
        })
    }
}

/// Mean clamped binary cross-entropy; `ones` is [1, batch]
fn mean_cross_entropy<B: Backend>(
    ones: &Tensor<B, 2>,
    probs: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    n: f64,
) -> f64 {
    let probs_clamped = probs.clamp(PROB_EPS, 1.0 - PROB_EPS);
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    let total: f64 = ones.clone().matmul(loss).into_scalar().elem();
    total / n
}

fn squared_norm<B: Backend>(weight: Tensor<B, 2>) -> f64 {
    weight
        .clone()
        .transpose()
        .matmul(weight)
        .into_scalar()
        .elem()
}
