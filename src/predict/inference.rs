//! Win probability estimation for the upcoming game

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::NdArray;
use serde::Serialize;
use std::fmt;

use crate::features::{FeatureRow, FeatureTable};
use crate::predict::odds::MoneylineOdds;
use crate::training::{FittedClassifier, LogisticTrainer, Metrics};
use crate::{FitScope, ModelConfig, MoneylineError, Result, Venue};

/// CPU backend for fitting and scoring; fits are small and must be reproducible
pub type InferenceBackend = NdArray<f64>;

/// Estimated win probability with a summary of the fit behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinEstimate {
    /// Probability the subject team wins, unrounded
    pub probability: f64,
    pub training_rows: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Weights in normalized feature space
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Fits the win classifier on a feature table and scores the upcoming game
pub struct Estimator {
    config: ModelConfig,
    device: NdArrayDevice,
}

impl Estimator {
    pub fn new(config: ModelConfig) -> Self {
        Estimator {
            config,
            device: NdArrayDevice::default(),
        }
    }

    /// Fit a fresh classifier on labelled rows
    pub fn fit(&self, rows: &[FeatureRow]) -> Result<FittedClassifier<InferenceBackend>> {
        LogisticTrainer::<InferenceBackend>::new(self.device, &self.config).fit(rows)
    }

    /// Win probability for the table's upcoming game
    pub fn estimate(&self, table: &FeatureTable) -> Result<WinEstimate> {
        let (fitted, training_rows, probability) = match self.config.fit_scope {
            FitScope::AllHistory => {
                let rows = table.historical();
                let fitted = self.fit(rows)?;
                let probs = fitted.predict(std::slice::from_ref(table.upcoming()));
                (fitted, rows.len(), probs.first().copied())
            }
            FitScope::TrainSplit => {
                // The upcoming game is always the final holdout row
                let (train, _) = table.chronological_split(self.config.holdout_fraction);
                let fitted = self.fit(train)?;
                let probs = fitted.predict(std::slice::from_ref(table.upcoming()));
                (fitted, train.len(), probs.first().copied())
            }
        };

        let probability = probability.ok_or(MoneylineError::InsufficientRows {
            rows: table.len(),
            required: 1,
        })?;

        log::debug!(
            "Coefficients {:?}, intercept {}",
            fitted.coefficients(),
            fitted.intercept()
        );
        log::info!(
            "Win probability {:.3} against {} ({} training rows)",
            probability,
            table.upcoming().opponent,
            training_rows
        );

        Ok(WinEstimate {
            probability,
            training_rows,
            iterations: fitted.iterations,
            converged: fitted.converged,
            coefficients: fitted.coefficients(),
            intercept: fitted.intercept(),
        })
    }

    /// Fit on the leading historical rows and score the trailing holdout
    pub fn evaluate(&self, table: &FeatureTable) -> Result<Metrics> {
        let historical = table.historical();
        if historical.len() < 2 {
            return Err(MoneylineError::InsufficientRows {
                rows: historical.len(),
                required: 2,
            });
        }

        let (train, holdout) = table.historical_split(self.config.holdout_fraction);
        let fitted = self.fit(train)?;

        let probs = fitted.predict(holdout);
        let labels: Vec<u8> = holdout.iter().map(FeatureRow::label).collect();
        let metrics = Metrics::from_predictions(&probs, &labels);

        log::info!(
            "Holdout of {} games after training on {}: {}",
            holdout.len(),
            train.len(),
            metrics
        );
        Ok(metrics)
    }
}

/// Model estimate compared with the bookmaker's price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueReport {
    pub team: String,
    pub opponent: String,
    pub venue: Venue,
    pub odds: MoneylineOdds,
    pub win_probability: f64,
    pub book_probability: f64,
    /// Model probability minus implied probability
    pub value: f64,
}

impl ValueReport {
    pub fn new(
        team: &str,
        opponent: &str,
        venue: Venue,
        odds: MoneylineOdds,
        estimate: &WinEstimate,
    ) -> Self {
        let book_probability = odds.implied_probability();
        ValueReport {
            team: team.to_string(),
            opponent: opponent.to_string(),
            venue,
            odds,
            win_probability: estimate.probability,
            book_probability,
            value: estimate.probability - book_probability,
        }
    }

    /// Whether the model rates the team above the book
    pub fn has_value(&self) -> bool {
        self.value > 0.0
    }
}

impl fmt::Display for ValueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Calculated win probability: {}\tBook probability: {}",
            self.win_probability, self.book_probability
        )?;
        write!(f, "Value over book: {}", self.value)
    }
}

/// Format a report for display
pub fn format_report(report: &ValueReport) -> String {
    let verdict = if report.has_value() {
        "value on"
    } else {
        "no value on"
    };
    let at = match report.venue {
        Venue::Home => "vs",
        Venue::Away => "@",
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} {} {} ({})
├─────────────────────────────────────────────────┤
│  Model probability:  {:.1}%
│  Book probability:   {:.1}%
│  Value over book:    {:+.1} pts, {} {}
└─────────────────────────────────────────────────┘
"#,
        report.team,
        at,
        report.opponent,
        report.odds,
        report.win_probability * 100.0,
        report.book_probability * 100.0,
        report.value * 100.0,
        verdict,
        report.team
    )
}
