//! Feature construction
//!
//! Normalizes the season efficiency table and joins it onto the game log.

pub mod efficiency;
pub mod joiner;

pub use efficiency::{EfficiencyMetrics, EfficiencyRow, EfficiencyTable};
pub use joiner::{FeatureJoiner, FeatureRow, FeatureTable, FEATURE_COLUMNS};
