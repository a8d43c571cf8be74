//! NBA stats API client for team game logs
//!
//! Queries the `leaguegamefinder` endpoint, which returns a team's games
//! newest first as a header row plus positional row arrays.

use super::{get_text, http_client, with_retry, GameSource};
use crate::{DataConfig, DataSource, MoneylineError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One game as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct RawGame {
    pub game_date: Option<NaiveDate>,
    /// e.g. "BOS vs. NYK" or "BOS @ NYK"
    pub matchup: String,
    /// "W", "L", or None for games without a result
    pub wl: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameFinderResponse {
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSet {
    #[serde(default)]
    name: String,
    headers: Vec<String>,
    row_set: Vec<Vec<serde_json::Value>>,
}

/// Client for stats.nba.com
pub struct NbaStatsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    max_attempts: u32,
}

impl NbaStatsClient {
    pub fn new(config: &DataConfig) -> Result<Self> {
        Ok(NbaStatsClient {
            client: http_client(config.timeout_secs)?,
            base_url: config.games_url.clone(),
            max_attempts: config.max_attempts,
        })
    }

    fn fetch_json(&self, team_id: u32) -> Result<String> {
        let team_id = team_id.to_string();
        let query = [
            ("PlayerOrTeam", "T"),
            ("LeagueID", "00"),
            ("SeasonType", "Regular Season"),
            ("TeamID", team_id.as_str()),
        ];

        log::debug!("Fetching {} for team {}", self.base_url, team_id);

        with_retry(
            || {
                let request = self
                    .client
                    .get(&self.base_url)
                    .query(&query)
                    .header("Accept", "application/json, text/plain, */*")
                    .header("Referer", "https://www.nba.com/")
                    .header("Origin", "https://www.nba.com")
                    .header("x-nba-stats-origin", "stats")
                    .header("x-nba-stats-token", "true");
                get_text(request, DataSource::NbaStats)
            },
            self.max_attempts,
        )
    }
}

impl GameSource for NbaStatsClient {
    fn source(&self) -> DataSource {
        DataSource::NbaStats
    }

    fn fetch_games(&self, provider_id: u32) -> Result<Vec<RawGame>> {
        log::info!("Fetching game log for team {}", provider_id);
        let body = self.fetch_json(provider_id)?;
        let games = parse_game_finder(&body)?;
        log::info!("Fetched {} games", games.len());
        Ok(games)
    }
}

/// A saved `leaguegamefinder` response
pub struct GameFinderFile {
    path: PathBuf,
}

impl GameFinderFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        GameFinderFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl GameSource for GameFinderFile {
    fn source(&self) -> DataSource {
        DataSource::NbaStats
    }

    /// The file already holds one team's games, so the id is not used
    fn fetch_games(&self, _provider_id: u32) -> Result<Vec<RawGame>> {
        log::info!("Reading game log from {}", self.path.display());
        let body = std::fs::read_to_string(&self.path)?;
        parse_game_finder(&body)
    }
}

/// Parse a `leaguegamefinder` response body, keeping provider order
pub fn parse_game_finder(body: &str) -> Result<Vec<RawGame>> {
    let response: GameFinderResponse = serde_json::from_str(body)?;

    let results = response.result_sets.into_iter().next().ok_or_else(|| {
        MoneylineError::Fetch {
            data_source: DataSource::NbaStats,
            message: "response has no result sets".to_string(),
        }
    })?;
    log::debug!("Result set {:?} with {} rows", results.name, results.row_set.len());

    let column = |name: &str| results.headers.iter().position(|h| h == name);
    let (matchup_idx, wl_idx) = match (column("MATCHUP"), column("WL")) {
        (Some(m), Some(w)) => (m, w),
        (m, w) => {
            let missing = [("MATCHUP", m), ("WL", w)]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(MoneylineError::Schema { missing });
        }
    };
    let date_idx = column("GAME_DATE");

    let games = results
        .row_set
        .iter()
        .map(|row| {
            let text = |idx: usize| row.get(idx).and_then(|v| v.as_str()).map(str::to_string);
            RawGame {
                game_date: date_idx
                    .and_then(text)
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                matchup: text(matchup_idx).unwrap_or_default(),
                wl: text(wl_idx),
            }
        })
        .collect();

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "resource": "leaguegamefinderparameters",
        "resultSets": [{
            "name": "LeagueGameFinderResults",
            "headers": ["SEASON_ID", "TEAM_ID", "GAME_DATE", "MATCHUP", "WL", "PTS"],
            "rowSet": [
                ["22024", 1610612738, "2025-04-13", "BOS vs. CHA", "W", 93],
                ["22024", 1610612738, "2025-04-11", "BOS @ CHA", "L", 86],
                ["22024", 1610612738, "2025-04-10", "BOS @ NYK", null, 0]
            ]
        }]
    }"#;

    #[test]
    fn test_parse_game_finder() {
        let games = parse_game_finder(RESPONSE).unwrap();

        assert_eq!(games.len(), 3);
        assert_eq!(games[0].matchup, "BOS vs. CHA");
        assert_eq!(games[0].wl.as_deref(), Some("W"));
        assert_eq!(games[0].game_date, NaiveDate::from_ymd_opt(2025, 4, 13));
        assert_eq!(games[1].matchup, "BOS @ CHA");
        assert_eq!(games[2].wl, None);
    }

    #[test]
    fn test_missing_columns() {
        let body = r#"{"resultSets": [{"name": "x", "headers": ["GAME_DATE", "WL"], "rowSet": []}]}"#;

        match parse_game_finder(body) {
            Err(MoneylineError::Schema { missing }) => assert_eq!(missing, vec!["MATCHUP"]),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_result_sets() {
        let body = r#"{"resultSets": []}"#;
        assert!(matches!(
            parse_game_finder(body),
            Err(MoneylineError::Fetch { .. })
        ));
    }
}
