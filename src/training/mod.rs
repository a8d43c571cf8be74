//! Model training
//!
//! Feature batching, the logistic fit loop, and holdout metrics.

pub mod dataset;
pub mod logistic_trainer;
pub mod metrics;

pub use dataset::{FeatureBatch, FeatureBatcher, FeatureNormalization};
pub use logistic_trainer::{FittedClassifier, LogisticTrainer};
pub use metrics::Metrics;
