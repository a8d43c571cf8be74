//! End-to-end feature table assembly for one matchup

use crate::data::scrapers::{EfficiencySource, GameSource};
use crate::data::{GameLogBuilder, TeamDirectory};
use crate::features::joiner::require_opponent;
use crate::features::{EfficiencyTable, FeatureJoiner, FeatureTable};
use crate::{Config, Result, Venue};

/// The game being priced
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    /// Team code of the side being bet on
    pub team: String,
    /// Opponent team code
    pub opponent: String,
    pub venue: Venue,
}

/// Fetches both data sources and joins them into a feature table
pub struct Pipeline<'a> {
    config: &'a Config,
    teams: &'a TeamDirectory,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, teams: &'a TeamDirectory) -> Self {
        Pipeline { config, teams }
    }

    /// Build the feature table for a matchup.
    ///
    /// Both codes are resolved and the opponent's ratings checked before the
    /// game log is requested.
    pub fn feature_table(
        &self,
        matchup: &Matchup,
        games: &dyn GameSource,
        efficiency: &dyn EfficiencySource,
    ) -> Result<FeatureTable> {
        let team = self.teams.resolve(&matchup.team)?;
        let opponent = self.teams.resolve(&matchup.opponent)?;
        log::info!(
            "Pricing {} ({}) {} {} ({})",
            team.name,
            team.code,
            if matchup.venue == Venue::Home { "vs" } else { "@" },
            opponent.name,
            opponent.code
        );

        log::info!("Loading efficiency ratings from {}", efficiency.source());
        let ratings = EfficiencyTable::from_raw(&efficiency.fetch_table()?)?;
        require_opponent(&ratings, &opponent.name)?;

        log::info!("Loading game log from {}", games.source());
        let game_log = GameLogBuilder::new(self.teams)
            .with_limit(self.config.data.game_limit)
            .with_unknown_opponent(self.config.data.unknown_opponent)
            .fetch(&team.code, games)?;

        FeatureJoiner::new(&ratings)
            .with_missing_policy(self.config.features.missing_efficiency)
            .join(&game_log, &opponent.name, matchup.venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scrapers::{RawGame, RawTable};
    use crate::{DataSource, MoneylineError, UnknownTeamPolicy};
    use std::cell::Cell;

    struct FixedGames {
        games: Vec<RawGame>,
        calls: Cell<usize>,
    }

    impl GameSource for FixedGames {
        fn source(&self) -> DataSource {
            DataSource::NbaStats
        }

        fn fetch_games(&self, provider_id: u32) -> Result<Vec<RawGame>> {
            assert_eq!(provider_id, 1610612738);
            self.calls.set(self.calls.get() + 1);
            Ok(self.games.clone())
        }
    }

    struct FixedTable(RawTable);

    impl EfficiencySource for FixedTable {
        fn source(&self) -> DataSource {
            DataSource::BasketballReference
        }

        fn fetch_table(&self) -> Result<RawTable> {
            Ok(self.0.clone())
        }
    }

    fn games(matchups: &[(&str, &str)]) -> FixedGames {
        FixedGames {
            games: matchups
                .iter()
                .map(|(m, wl)| RawGame {
                    game_date: None,
                    matchup: m.to_string(),
                    wl: Some(wl.to_string()),
                })
                .collect(),
            calls: Cell::new(0),
        }
    }

    fn ratings(teams: &[(&str, &str)]) -> FixedTable {
        let mut rows: Vec<Vec<String>> = teams
            .iter()
            .map(|&(name, net)| {
                [name, net, "1.0", ".540", "25.0", "12.0", "76.0"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .collect();
        rows.push(
            ["League Average", "0.0", "0.0", ".540", "25.0", "12.0", "76.0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        FixedTable(RawTable {
            headers: ["Team", "NRtg", "SRS", "eFG%", "ORB%", "TOV%", "DRB%"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows,
        })
    }

    fn matchup(opponent: &str, venue: Venue) -> Matchup {
        Matchup {
            team: "bos".to_string(),
            opponent: opponent.to_string(),
            venue,
        }
    }

    #[test]
    fn test_feature_table() {
        let config = Config::default();
        let teams = TeamDirectory::nba();
        let source = games(&[
            ("BOS vs. NYK", "W"),
            ("BOS @ SEA", "W"),
            ("BOS @ MIA", "L"),
        ]);
        let table = ratings(&[("New York Knicks", "4.5"), ("Miami Heat", "-1.0")]);

        let features = Pipeline::new(&config, &teams)
            .feature_table(&matchup("MIA", Venue::Home), &source, &table)
            .unwrap();

        // SEA is not in the directory and is skipped
        assert_eq!(features.historical().len(), 2);
        assert_eq!(features.historical()[0].opponent, "Heat");
        assert_eq!(features.historical()[1].opponent, "Knicks");
        assert_eq!(features.upcoming().opponent, "Heat");
        assert_eq!(&features.upcoming().features()[..2], &[1.0, -1.0]);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_unknown_codes_fail_first() {
        let config = Config::default();
        let teams = TeamDirectory::nba();
        let source = games(&[("BOS vs. NYK", "W")]);
        let table = ratings(&[("New York Knicks", "4.5")]);

        let result = Pipeline::new(&config, &teams).feature_table(
            &matchup("SEA", Venue::Away),
            &source,
            &table,
        );
        assert!(matches!(result, Err(MoneylineError::UnknownTeam(code)) if code == "SEA"));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_unrated_opponent_fails_before_fetching_games() {
        let config = Config::default();
        let teams = TeamDirectory::nba();
        let source = games(&[("BOS vs. NYK", "W")]);
        let table = ratings(&[("New York Knicks", "4.5")]);

        let result = Pipeline::new(&config, &teams).feature_table(
            &matchup("MIA", Venue::Away),
            &source,
            &table,
        );
        assert!(matches!(result, Err(MoneylineError::MissingEfficiency(t)) if t == "Heat"));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_missing_efficiency_policy_from_config() {
        let mut config = Config::default();
        let teams = TeamDirectory::nba();
        let source = games(&[("BOS vs. NYK", "W"), ("BOS @ LAL", "L")]);
        let table = ratings(&[("New York Knicks", "4.5")]);

        let result = Pipeline::new(&config, &teams).feature_table(
            &matchup("NYK", Venue::Away),
            &source,
            &table,
        );
        assert!(matches!(result, Err(MoneylineError::MissingEfficiency(t)) if t == "Lakers"));

        config.features.missing_efficiency = UnknownTeamPolicy::Skip;
        let features = Pipeline::new(&config, &teams)
            .feature_table(&matchup("NYK", Venue::Away), &source, &table)
            .unwrap();
        assert_eq!(features.historical().len(), 1);
    }
}
