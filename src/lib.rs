//! NBA moneyline value estimation
//!
//! Builds a feature table from a team's recent game log and the season's
//! team efficiency ratings, fits a regularized logistic classifier on it and
//! compares the estimated win probability with the bookmaker's implied one.

pub mod data;
pub mod features;
pub mod input;
pub mod model;
pub mod predict;
pub mod training;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where the subject team played a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    /// Numeric flag used as a model feature (1 = home, 0 = away)
    pub fn flag(&self) -> u8 {
        match self {
            Venue::Home => 1,
            Venue::Away => 0,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => write!(f, "home"),
            Venue::Away => write!(f, "away"),
        }
    }
}

impl FromStr for Venue {
    type Err = MoneylineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Venue::Home),
            "away" => Ok(Venue::Away),
            _ => Err(MoneylineError::InvalidInput(format!(
                "venue must be home or away, got {:?}",
                s
            ))),
        }
    }
}

/// Remote data providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    NbaStats,
    BasketballReference,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::NbaStats => write!(f, "NBA Stats"),
            DataSource::BasketballReference => write!(f, "Basketball Reference"),
        }
    }
}

/// One historical game from the subject team's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game date, when the provider reports one
    pub date: Option<NaiveDate>,
    /// Opponent mascot as listed in the team directory
    pub opponent: String,
    pub venue: Venue,
    pub won: bool,
}

impl GameRecord {
    /// Win/loss label (1 = win, 0 = loss)
    pub fn outcome(&self) -> u8 {
        u8::from(self.won)
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum MoneylineError {
    #[error("Fetch failed for {data_source}: {message}")]
    Fetch {
        data_source: DataSource,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("No efficiency ratings for {0}")]
    MissingEfficiency(String),

    #[error("Efficiency table is missing columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Training data has a single outcome class ({rows} rows)")]
    DegenerateLabels { rows: usize },

    #[error("Not enough rows: have {rows}, need {required}")]
    InsufficientRows { rows: usize, required: usize },

    #[error("Model fit diverged: non-finite loss at iteration {iteration}")]
    Diverged { iteration: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, MoneylineError>;

/// What to do when a team name cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownTeamPolicy {
    /// Drop the affected row and carry on
    Skip,
    /// Fail the run
    Abort,
}

/// Which rows the output model is fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitScope {
    /// Every historical row; the upcoming game is scored separately
    AllHistory,
    /// Leading chronological partition of the joined table, upcoming row included in the holdout
    TrainSplit,
}

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Season identified by the year it ends in (2025 = 2024-25)
    pub season: u16,
    pub game_limit: usize,
    pub games_url: String,
    /// Season page URL, `{season}` is substituted
    pub efficiency_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub unknown_opponent: UnknownTeamPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub missing_efficiency: UnknownTeamPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Inverse L2 regularization strength.
    ///
    /// The penalty applies to weights on z-scored features, not to raw
    /// feature coefficients, so a given `c` regularizes every column alike
    /// whatever its units.
    pub c: f64,
    /// Upper bound on the gradient step; smaller when the penalty is steep
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    pub holdout_fraction: f64,
    pub fit_scope: FitScope,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            c: 0.5,
            learning_rate: 0.1,
            max_iter: 100_000,
            tolerance: 1e-7,
            holdout_fraction: 0.1,
            fit_scope: FitScope::AllHistory,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                season: current_season(chrono::Utc::now().date_naive()),
                game_limit: 200,
                games_url: "https://stats.nba.com/stats/leaguegamefinder".to_string(),
                efficiency_url: "https://www.basketball-reference.com/leagues/NBA_{season}.html"
                    .to_string(),
                timeout_secs: 30,
                max_attempts: 3,
                unknown_opponent: UnknownTeamPolicy::Skip,
            },
            features: FeatureConfig {
                missing_efficiency: UnknownTeamPolicy::Abort,
            },
            model: ModelConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoneylineError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| MoneylineError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MoneylineError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Season page URL for the configured season
    pub fn efficiency_url(&self) -> String {
        self.data
            .efficiency_url
            .replace("{season}", &self.data.season.to_string())
    }
}

/// Season in progress on `today`; seasons start in October and are named by their final year
pub fn current_season(today: NaiveDate) -> u16 {
    let year = u16::try_from(today.year()).unwrap_or(2025);
    if today.month() >= 10 {
        year + 1
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_parsing() {
        assert_eq!("home".parse::<Venue>().unwrap(), Venue::Home);
        assert_eq!("AWAY".parse::<Venue>().unwrap(), Venue::Away);
        assert_eq!(" Home ".parse::<Venue>().unwrap(), Venue::Home);
        assert!("neutral".parse::<Venue>().is_err());

        assert_eq!(Venue::Home.flag(), 1);
        assert_eq!(Venue::Away.flag(), 0);
    }

    #[test]
    fn test_current_season() {
        let october = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        assert_eq!(current_season(october), 2025);

        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(current_season(march), 2025);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.data.game_limit, 200);
        assert_eq!(parsed.model.c, 0.5);
        assert_eq!(parsed.model.fit_scope, FitScope::AllHistory);
        assert_eq!(parsed.data.unknown_opponent, UnknownTeamPolicy::Skip);
        assert!(text.contains("all-history"));
    }

    #[test]
    fn test_efficiency_url() {
        let mut config = Config::default();
        config.data.season = 2025;
        assert_eq!(
            config.efficiency_url(),
            "https://www.basketball-reference.com/leagues/NBA_2025.html"
        );
    }
}
