//! Feature table assembly
//!
//! Joins each game in the log with its opponent's season ratings and appends
//! the upcoming game as a final, unlabelled row.

use crate::data::GameLog;
use crate::features::efficiency::{EfficiencyMetrics, EfficiencyTable};
use crate::{MoneylineError, Result, UnknownTeamPolicy, Venue};
use serde::Serialize;

/// Model input columns, shared by training and inference rows
pub const FEATURE_COLUMNS: [&str; FeatureRow::DIM] =
    ["H1/A0", "NetRtg", "SRS", "eFG%", "OREB%", "TOV%", "DREB%"];

/// One game with its opponent's ratings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub opponent: String,
    pub venue: Venue,
    /// Always false for the upcoming game
    pub won: bool,
    pub metrics: EfficiencyMetrics,
}

impl FeatureRow {
    pub const DIM: usize = 1 + EfficiencyMetrics::DIM;

    /// Feature values in `FEATURE_COLUMNS` order
    pub fn features(&self) -> [f64; Self::DIM] {
        let [a, b, c, d, e, f] = self.metrics.to_array();
        [f64::from(self.venue.flag()), a, b, c, d, e, f]
    }

    pub fn label(&self) -> u8 {
        u8::from(self.won)
    }
}

/// Joined table: historical games oldest first, upcoming game last
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Build from historical rows and the upcoming game, which is forced to the end
    pub fn new(mut historical: Vec<FeatureRow>, mut upcoming: FeatureRow) -> Self {
        upcoming.won = false;
        historical.push(upcoming);
        FeatureTable { rows: historical }
    }

    /// Every row, the upcoming game last
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Labelled rows only
    pub fn historical(&self) -> &[FeatureRow] {
        &self.rows[..self.rows.len() - 1]
    }

    /// The synthetic row for the game being priced
    pub fn upcoming(&self) -> &FeatureRow {
        &self.rows[self.rows.len() - 1]
    }

    /// Total rows including the upcoming game
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true; the upcoming row is always present
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split all rows chronologically; the holdout is the trailing `ceil(fraction * n)` rows
    pub fn chronological_split(&self, holdout_fraction: f64) -> (&[FeatureRow], &[FeatureRow]) {
        split_tail(&self.rows, holdout_fraction)
    }

    /// Same split over the labelled rows only
    pub fn historical_split(&self, holdout_fraction: f64) -> (&[FeatureRow], &[FeatureRow]) {
        split_tail(self.historical(), holdout_fraction)
    }
}

/// Number of trailing rows held out for a fraction, at least one when there are rows
pub fn holdout_len(rows: usize, holdout_fraction: f64) -> usize {
    if rows == 0 {
        return 0;
    }
    let n = (rows as f64 * holdout_fraction.clamp(0.0, 1.0)).ceil() as usize;
    n.clamp(1, rows)
}

fn split_tail(rows: &[FeatureRow], holdout_fraction: f64) -> (&[FeatureRow], &[FeatureRow]) {
    let holdout = holdout_len(rows.len(), holdout_fraction);
    rows.split_at(rows.len() - holdout)
}

/// Joins a game log with season efficiency ratings
pub struct FeatureJoiner<'a> {
    efficiency: &'a EfficiencyTable,
    missing: UnknownTeamPolicy,
}

impl<'a> FeatureJoiner<'a> {
    pub fn new(efficiency: &'a EfficiencyTable) -> Self {
        FeatureJoiner {
            efficiency,
            missing: UnknownTeamPolicy::Abort,
        }
    }

    /// Policy for historical opponents without ratings; the upcoming opponent always aborts
    pub fn with_missing_policy(mut self, policy: UnknownTeamPolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Join the log and append the upcoming game against `opponent` (a mascot)
    pub fn join(&self, games: &GameLog, opponent: &str, venue: Venue) -> Result<FeatureTable> {
        let mut historical = Vec::with_capacity(games.len() + 1);

        for record in games.iter() {
            match self.efficiency.lookup(&record.opponent) {
                Ok(row) => historical.push(FeatureRow {
                    opponent: record.opponent.clone(),
                    venue: record.venue,
                    won: record.won,
                    metrics: row.metrics,
                }),
                Err(e) if self.missing == UnknownTeamPolicy::Skip => {
                    log::warn!("Skipping game against {}: {}", record.opponent, e);
                }
                Err(e) => return Err(e),
            }
        }

        let upcoming = self.efficiency.lookup(opponent)?;
        log::info!(
            "Joined {} games, upcoming {} game against {}",
            historical.len(),
            venue,
            opponent
        );

        Ok(FeatureTable::new(
            historical,
            FeatureRow {
                opponent: opponent.to_string(),
                venue,
                won: false,
                metrics: upcoming.metrics,
            },
        ))
    }
}

/// Fail unless the upcoming opponent has ratings
pub fn require_opponent(efficiency: &EfficiencyTable, opponent: &str) -> Result<()> {
    efficiency
        .get(opponent)
        .map(|_| ())
        .ok_or_else(|| MoneylineError::MissingEfficiency(opponent.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::efficiency::EfficiencyRow;
    use crate::GameRecord;

    fn efficiency() -> EfficiencyTable {
        let row = |team: &str, net: f64| EfficiencyRow {
            team: team.to_string(),
            metrics: EfficiencyMetrics::from_array([net, net + 1.0, 0.54, 25.0, 12.0, 75.0]),
        };
        EfficiencyTable::from_rows(vec![row("Knicks", 4.0), row("Heat", -1.0), row("Lakers", 1.5)])
    }

    fn record(opponent: &str, venue: Venue, won: bool) -> GameRecord {
        GameRecord {
            date: None,
            opponent: opponent.to_string(),
            venue,
            won,
        }
    }

    fn game_log() -> GameLog {
        GameLog::from_records(vec![
            record("Knicks", Venue::Home, true),
            record("Heat", Venue::Away, false),
            record("Lakers", Venue::Home, true),
        ])
    }

    #[test]
    fn test_join_appends_upcoming_last() {
        let eff = efficiency();
        let table = FeatureJoiner::new(&eff).join(&game_log(), "Heat", Venue::Away).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.historical().len(), 3);

        let upcoming = table.upcoming();
        assert_eq!(upcoming.opponent, "Heat");
        assert_eq!(upcoming.label(), 0);
        assert_eq!(upcoming.features()[0], 0.0);
        assert_eq!(upcoming.features()[1], -1.0);
        assert_eq!(table.rows().last(), Some(upcoming));
    }

    #[test]
    fn test_feature_order() {
        let eff = efficiency();
        let table = FeatureJoiner::new(&eff).join(&game_log(), "Knicks", Venue::Home).unwrap();

        let first = &table.rows()[0];
        assert_eq!(first.features(), [1.0, 4.0, 5.0, 0.54, 25.0, 12.0, 75.0]);
        assert_eq!(first.label(), 1);
        assert_eq!(FEATURE_COLUMNS.len(), FeatureRow::DIM);
    }

    #[test]
    fn test_missing_history_aborts_by_default() {
        let eff = efficiency();
        let mut records = game_log().records().to_vec();
        records.push(record("Sonics", Venue::Home, true));

        let result = FeatureJoiner::new(&eff).join(&GameLog::from_records(records), "Heat", Venue::Home);
        assert!(matches!(result, Err(MoneylineError::MissingEfficiency(t)) if t == "Sonics"));
    }

    #[test]
    fn test_missing_history_skip_policy() {
        let eff = efficiency();
        let mut records = game_log().records().to_vec();
        records.insert(1, record("Sonics", Venue::Home, true));

        let table = FeatureJoiner::new(&eff)
            .with_missing_policy(UnknownTeamPolicy::Skip)
            .join(&GameLog::from_records(records), "Heat", Venue::Home)
            .unwrap();
        assert_eq!(table.historical().len(), 3);
    }

    #[test]
    fn test_missing_upcoming_opponent_always_fails() {
        let eff = efficiency();
        let result = FeatureJoiner::new(&eff)
            .with_missing_policy(UnknownTeamPolicy::Skip)
            .join(&game_log(), "Sonics", Venue::Home);

        assert!(matches!(result, Err(MoneylineError::MissingEfficiency(_))));
        assert!(require_opponent(&eff, "Sonics").is_err());
        assert!(require_opponent(&eff, "Heat").is_ok());
    }

    #[test]
    fn test_empty_log_still_has_upcoming_row() {
        let eff = efficiency();
        let table = FeatureJoiner::new(&eff)
            .join(&GameLog::default(), "Lakers", Venue::Home)
            .unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.historical().is_empty());
        assert_eq!(table.upcoming().opponent, "Lakers");
    }

    #[test]
    fn test_chronological_split() {
        assert_eq!(holdout_len(0, 0.1), 0);
        assert_eq!(holdout_len(5, 0.1), 1);
        assert_eq!(holdout_len(50, 0.1), 5);
        assert_eq!(holdout_len(51, 0.1), 6);

        let eff = efficiency();
        let records: Vec<_> = (0..19)
            .map(|i| record("Knicks", Venue::Home, i % 2 == 0))
            .collect();
        let table = FeatureJoiner::new(&eff)
            .join(&GameLog::from_records(records), "Heat", Venue::Away)
            .unwrap();

        let (train, holdout) = table.chronological_split(0.1);
        assert_eq!(train.len(), 18);
        assert_eq!(holdout.len(), 2);
        assert_eq!(holdout.last().map(|r| r.opponent.as_str()), Some("Heat"));

        let (train, holdout) = table.historical_split(0.1);
        assert_eq!(train.len(), 17);
        assert_eq!(holdout.len(), 2);
        assert!(holdout.iter().all(|r| r.opponent == "Knicks"));
    }
}
