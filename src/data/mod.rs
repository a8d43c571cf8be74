//! Data ingestion
//!
//! Team directory, remote fetchers and game log construction.

pub mod game_log;
pub mod scrapers;
pub mod teams;

pub use game_log::{GameLog, GameLogBuilder};
pub use teams::TeamDirectory;
