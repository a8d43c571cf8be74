//! Tensor batches built from feature rows

use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::features::FeatureRow;

/// Z-score normalization fitted on training rows
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalization {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl FeatureNormalization {
    /// Compute per-column mean and standard deviation.
    ///
    /// Constant columns get a unit std so they normalize to zero instead of
    /// exploding on rows that differ from the training constant.
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let mut sum = [0.0f64; FeatureRow::DIM];
        let mut sum_sq = [0.0f64; FeatureRow::DIM];

        for row in rows {
            for (j, value) in row.features().iter().enumerate() {
                sum[j] += value;
                sum_sq[j] += value * value;
            }
        }

        let n = rows.len().max(1) as f64;
        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let std = sum_sq
            .iter()
            .zip(mean.iter())
            .map(|(sq, m)| {
                let sd = (sq / n - m * m).max(0.0).sqrt();
                if sd < 1e-9 {
                    1.0
                } else {
                    sd
                }
            })
            .collect();

        FeatureNormalization { mean, std }
    }

    /// Normalize a feature tensor: (x - mean) / std
    pub fn normalize<B: Backend>(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = features.device();
        let mean = Tensor::<B, 1>::from_floats(self.mean.as_slice(), &device).unsqueeze_dim(0);
        let std = Tensor::<B, 1>::from_floats(self.std.as_slice(), &device).unsqueeze_dim(0);

        (features - mean) / std
    }
}

/// Feature matrix and labels for a set of rows
#[derive(Debug, Clone)]
pub struct FeatureBatch<B: Backend> {
    /// [batch, FeatureRow::DIM]
    pub features: Tensor<B, 2>,
    /// Win labels [batch]
    pub labels: Tensor<B, 1>,
}

/// Builds full batches from feature rows
#[derive(Clone)]
pub struct FeatureBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> FeatureBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        FeatureBatcher { device }
    }
}

impl<B: Backend> Batcher<B, FeatureRow, FeatureBatch<B>> for FeatureBatcher<B> {
    fn batch(&self, items: Vec<FeatureRow>, _device: &B::Device) -> FeatureBatch<B> {
        let batch_size = items.len();

        let feature_data: Vec<f64> = items.iter().flat_map(|row| row.features()).collect();
        let label_data: Vec<f64> = items.iter().map(|row| f64::from(row.label())).collect();

        let features = Tensor::<B, 1>::from_floats(feature_data.as_slice(), &self.device)
            .reshape([batch_size, FeatureRow::DIM]);
        let labels = Tensor::<B, 1>::from_floats(label_data.as_slice(), &self.device);

        FeatureBatch { features, labels }
    }
}
