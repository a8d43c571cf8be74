//! Prediction and inference
//!
//! Assemble the feature table for a matchup, estimate the win probability
//! and compare it with the bookmaker's price.

pub mod inference;
pub mod odds;
pub mod pipeline;

pub use inference::{format_report, Estimator, ValueReport, WinEstimate};
pub use odds::{implied_probability, is_valid_odds, MoneylineOdds};
pub use pipeline::{Matchup, Pipeline};
