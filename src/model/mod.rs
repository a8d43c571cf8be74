//! Classifier architecture

pub mod logistic;

pub use logistic::WinClassifier;
