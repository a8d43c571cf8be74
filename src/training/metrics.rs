//! Holdout evaluation metrics

use serde::Serialize;
use std::fmt;

/// Probability clamp used by the log loss
const EPS: f64 = 1e-7;

/// Metrics accumulated over predicted win probabilities
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Predictions on the correct side of 0.5
    pub correct: usize,
    /// Total predictions
    pub total: usize,
    /// Sum of clamped binary cross-entropy
    pub log_loss_sum: f64,
    /// Sum of squared probability errors
    pub brier_sum: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from paired probabilities and labels
    pub fn from_predictions(probs: &[f64], labels: &[u8]) -> Self {
        let mut metrics = Metrics::new();
        for (&p, &y) in probs.iter().zip(labels) {
            metrics.update(p, y);
        }
        metrics
    }

    /// Record one prediction
    pub fn update(&mut self, prob: f64, label: u8) {
        let y = f64::from(label.min(1));
        let p = prob.clamp(EPS, 1.0 - EPS);

        if (prob >= 0.5) == (label >= 1) {
            self.correct += 1;
        }
        self.total += 1;
        self.log_loss_sum += -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
        self.brier_sum += (prob - y).powi(2);
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn log_loss(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.log_loss_sum / self.total as f64
        }
    }

    pub fn brier(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.brier_sum / self.total as f64
        }
    }

    /// Merge another metrics instance
    pub fn merge(&mut self, other: &Metrics) {
        self.correct += other.correct;
        self.total += other.total;
        self.log_loss_sum += other.log_loss_sum;
        self.brier_sum += other.brier_sum;
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Games: {} | Acc: {:.2}% | Log loss: {:.4} | Brier: {:.4}",
            self.total,
            self.accuracy() * 100.0,
            self.log_loss(),
            self.brier()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = Metrics::new();
        assert_eq!(metrics.accuracy(), 0.0);
        assert_eq!(metrics.log_loss(), 0.0);
        assert_eq!(metrics.brier(), 0.0);
    }

    #[test]
    fn test_accuracy_and_brier() {
        let metrics = Metrics::from_predictions(&[0.75, 0.25, 0.5, 0.0], &[1, 1, 1, 0]);

        assert_eq!(metrics.total, 4);
        assert_eq!(metrics.correct, 3);
        assert_eq!(metrics.accuracy(), 0.75);
        // (0.0625 + 0.5625 + 0.25 + 0.0) / 4
        assert!((metrics.brier() - 0.21875).abs() < 1e-12);
    }

    #[test]
    fn test_log_loss_is_clamped() {
        let metrics = Metrics::from_predictions(&[0.0], &[1]);
        assert!(metrics.log_loss().is_finite());
        assert!((metrics.log_loss() - -(EPS.ln())).abs() < 1e-9);

        let even = Metrics::from_predictions(&[0.5, 0.5], &[0, 1]);
        assert!((even.log_loss() - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_merge() {
        let mut a = Metrics::from_predictions(&[0.9], &[1]);
        let b = Metrics::from_predictions(&[0.9], &[0]);
        a.merge(&b);

        assert_eq!(a.total, 2);
        assert_eq!(a.accuracy(), 0.5);
        assert!(a.to_string().contains("Acc: 50.00%"));
    }
}
