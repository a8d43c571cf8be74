//! Game log construction
//!
//! Turns the provider's newest-first game list into an oldest-first log of
//! (opponent, venue, outcome) records keyed by directory mascot names.

use crate::data::scrapers::{GameSource, RawGame};
use crate::data::teams::TeamDirectory;
use crate::{GameRecord, MoneylineError, Result, UnknownTeamPolicy, Venue};
use regex::Regex;
use std::sync::LazyLock;

/// Most recent games considered per run
pub const DEFAULT_GAME_LIMIT: usize = 200;

static MATCHUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(vs\.|@)\s*([A-Za-z]+)").unwrap());

/// Split a matchup description into the opponent code and the subject's venue.
///
/// "BOS vs. NYK" is a home game against NYK, "BOS @ NYK" an away game.
pub fn parse_matchup(matchup: &str) -> Option<(String, Venue)> {
    let caps = MATCHUP_PATTERN.captures(matchup)?;
    let venue = match caps.get(1)?.as_str() {
        "@" => Venue::Away,
        _ => Venue::Home,
    };
    Some((caps.get(2)?.as_str().to_uppercase(), venue))
}

/// Chronological (oldest first) game history for one team
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameLog {
    records: Vec<GameRecord>,
}

impl GameLog {
    /// Wrap records that are already oldest first
    pub fn from_records(records: Vec<GameRecord>) -> Self {
        GameLog { records }
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn wins(&self) -> usize {
        self.records.iter().filter(|r| r.won).count()
    }
}

/// Builds a `GameLog` from provider records
pub struct GameLogBuilder<'a> {
    teams: &'a TeamDirectory,
    limit: usize,
    unknown_opponent: UnknownTeamPolicy,
}

impl<'a> GameLogBuilder<'a> {
    pub fn new(teams: &'a TeamDirectory) -> Self {
        GameLogBuilder {
            teams,
            limit: DEFAULT_GAME_LIMIT,
            unknown_opponent: UnknownTeamPolicy::Skip,
        }
    }

    /// Number of most recent provider records to consider
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_unknown_opponent(mut self, policy: UnknownTeamPolicy) -> Self {
        self.unknown_opponent = policy;
        self
    }

    /// Fetch and build the log for a team code
    pub fn fetch(&self, team_code: &str, source: &dyn GameSource) -> Result<GameLog> {
        let provider_id = self.teams.provider_id(team_code)?;
        let raw = source.fetch_games(provider_id)?;
        self.build(&raw)
    }

    /// Build the log from newest-first provider records
    pub fn build(&self, raw: &[RawGame]) -> Result<GameLog> {
        let mut records = Vec::with_capacity(raw.len().min(self.limit));
        let mut dropped = 0usize;

        for game in raw.iter().take(self.limit) {
            match self.to_record(game) {
                Ok(record) => records.push(record),
                Err(e) if self.unknown_opponent == UnknownTeamPolicy::Skip => {
                    log::warn!("Skipping {:?}: {}", game.matchup, e);
                    dropped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        records.reverse();

        log::info!(
            "Game log: {} games ({} dropped), {} wins",
            records.len(),
            dropped,
            records.iter().filter(|r| r.won).count()
        );

        Ok(GameLog { records })
    }

    fn to_record(&self, game: &RawGame) -> Result<GameRecord> {
        let (code, venue) = parse_matchup(&game.matchup).ok_or_else(|| {
            MoneylineError::Parse(format!("unrecognized matchup {:?}", game.matchup))
        })?;
        let opponent = self.teams.name(&code)?.to_string();

        Ok(GameRecord {
            date: game.game_date,
            opponent,
            venue,
            won: game.wl.as_deref() == Some("W"),
        })
    }
}
