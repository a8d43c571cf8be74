//! Season efficiency table normalization
//!
//! Reduces the scraped advanced table to one row of six ratings per team,
//! keyed by mascot so it joins against the team directory.

use crate::data::scrapers::RawTable;
use crate::{MoneylineError, Result};
use serde::{Deserialize, Serialize};

/// Label of the aggregate row closing the source table
pub const LEAGUE_AVERAGE: &str = "League Average";

/// Source header of the team column
pub const TEAM_COLUMN: &str = "Team";

/// Source headers of the retained ratings, in model column order
pub const METRIC_COLUMNS: [&str; 6] = ["NRtg", "SRS", "eFG%", "ORB%", "TOV%", "DRB%"];

/// Six season ratings for one team
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    /// Point differential per 100 possessions
    pub net_rating: f64,
    /// Simple rating system
    pub srs: f64,
    /// Effective field goal percentage
    pub efg_pct: f64,
    /// Offensive rebound percentage
    pub orb_pct: f64,
    /// Turnover percentage
    pub tov_pct: f64,
    /// Defensive rebound percentage
    pub drb_pct: f64,
}

impl EfficiencyMetrics {
    pub const DIM: usize = 6;

    pub fn from_array(values: [f64; Self::DIM]) -> Self {
        let [net_rating, srs, efg_pct, orb_pct, tov_pct, drb_pct] = values;
        EfficiencyMetrics {
            net_rating,
            srs,
            efg_pct,
            orb_pct,
            tov_pct,
            drb_pct,
        }
    }

    pub fn to_array(&self) -> [f64; Self::DIM] {
        [
            self.net_rating,
            self.srs,
            self.efg_pct,
            self.orb_pct,
            self.tov_pct,
            self.drb_pct,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRow {
    /// Mascot, e.g. "Celtics"
    pub team: String,
    pub metrics: EfficiencyMetrics,
}

/// Cleaned season table, one row per team
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyTable {
    rows: Vec<EfficiencyRow>,
}

/// Reduce a full team name to its mascot ("Boston Celtics*" -> "Celtics")
pub fn mascot(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_end_matches('*')
        .to_string()
}

impl EfficiencyTable {
    pub fn from_rows(rows: Vec<EfficiencyRow>) -> Self {
        EfficiencyTable { rows }
    }

    /// Normalize a scraped table.
    ///
    /// Fails with `Schema` when expected headers are absent. The last row is
    /// the league average and is always dropped.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let (team_idx, metric_idx) = resolve_columns(raw)?;

        let (last, team_rows) = raw.rows.split_last().ok_or(MoneylineError::InsufficientRows {
            rows: 0,
            required: 1,
        })?;
        let last_label = last.get(team_idx).map(String::as_str).unwrap_or("");
        if last_label != LEAGUE_AVERAGE {
            log::warn!(
                "Dropping final row {:?}, expected {:?}",
                last_label,
                LEAGUE_AVERAGE
            );
        }

        let rows = team_rows
            .iter()
            .map(|cells| parse_row(cells, team_idx, &metric_idx))
            .collect::<Result<Vec<_>>>()?;

        log::info!("Efficiency table: {} teams", rows.len());
        Ok(EfficiencyTable { rows })
    }

    /// Row for a mascot, exact match
    pub fn get(&self, team: &str) -> Option<&EfficiencyRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    /// Row for a mascot, surfacing absence as a typed error
    pub fn lookup(&self, team: &str) -> Result<&EfficiencyRow> {
        self.get(team)
            .ok_or_else(|| MoneylineError::MissingEfficiency(team.to_string()))
    }

    pub fn rows(&self) -> &[EfficiencyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Map required headers to column indices, collecting every missing one
fn resolve_columns(raw: &RawTable) -> Result<(usize, [usize; EfficiencyMetrics::DIM])> {
    let mut missing = Vec::new();

    let team_idx = raw.column(TEAM_COLUMN);
    if team_idx.is_none() {
        missing.push(TEAM_COLUMN.to_string());
    }

    let mut metric_idx = [0usize; EfficiencyMetrics::DIM];
    for (slot, name) in metric_idx.iter_mut().zip(METRIC_COLUMNS) {
        match raw.column(name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }

    match team_idx {
        Some(team_idx) if missing.is_empty() => Ok((team_idx, metric_idx)),
        _ => Err(MoneylineError::Schema { missing }),
    }
}

fn parse_row(
    cells: &[String],
    team_idx: usize,
    metric_idx: &[usize; EfficiencyMetrics::DIM],
) -> Result<EfficiencyRow> {
    let team_name = cells
        .get(team_idx)
        .ok_or_else(|| MoneylineError::Parse(format!("row too short: {:?}", cells)))?;

    let mut values = [0.0f64; EfficiencyMetrics::DIM];
    for ((value, &idx), name) in values.iter_mut().zip(metric_idx).zip(METRIC_COLUMNS) {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        *value = cell.parse().map_err(|_| {
            MoneylineError::Parse(format!("{} for {}: {:?}", name, team_name, cell))
        })?;
    }

    Ok(EfficiencyRow {
        team: mascot(team_name),
        metrics: EfficiencyMetrics::from_array(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> RawTable {
        let headers = [
            "Rk", "Team", "Age", "SRS", "NRtg", "Pace", "eFG%", "TOV%", "ORB%", "eFG%", "TOV%",
            "DRB%", "Arena",
        ];
        let row = |team: &str, srs: &str, nrtg: &str| {
            [
                "1", team, "27.0", srs, nrtg, "98.5", ".550", "12.0", "25.0", ".530", "13.0",
                "76.0", "Somewhere",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
        };

        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: vec![
                row("Boston Celtics", "9.33", "9.1"),
                row("Portland Trail Blazers", "-3.10", "-2.8"),
                row("Philadelphia 76ers*", "-5.50", "-5.9"),
                row(LEAGUE_AVERAGE, "0.00", "0.0"),
            ],
        }
    }

    #[test]
    fn test_mascot() {
        assert_eq!(mascot("Boston Celtics"), "Celtics");
        assert_eq!(mascot("Portland Trail Blazers"), "Blazers");
        assert_eq!(mascot("Cleveland Cavaliers*"), "Cavaliers");
        assert_eq!(mascot("Heat"), "Heat");
    }

    #[test]
    fn test_league_average_dropped() {
        let table = EfficiencyTable::from_raw(&raw_table()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.get(LEAGUE_AVERAGE).is_none());
        assert!(table.get("Average").is_none());
        let teams: Vec<_> = table.rows().iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, ["Celtics", "Blazers", "76ers"]);
    }

    #[test]
    fn test_metrics_in_model_order() {
        let table = EfficiencyTable::from_raw(&raw_table()).unwrap();
        let celtics = table.lookup("Celtics").unwrap();

        // Offensive eFG%/TOV% come first in the source; the defensive repeats are ignored
        assert_eq!(
            celtics.metrics.to_array(),
            [9.1, 9.33, 0.55, 25.0, 12.0, 76.0]
        );
    }

    #[test]
    fn test_lookup_missing_team() {
        let table = EfficiencyTable::from_raw(&raw_table()).unwrap();
        assert!(matches!(
            table.lookup("Sonics"),
            Err(MoneylineError::MissingEfficiency(t)) if t == "Sonics"
        ));
    }

    #[test]
    fn test_missing_columns_reported() {
        let mut raw = raw_table();
        raw.headers[4] = "NetRtg".to_string();
        raw.headers[11] = "DRtg".to_string();

        match EfficiencyTable::from_raw(&raw) {
            Err(MoneylineError::Schema { missing }) => assert_eq!(missing, ["NRtg", "DRB%"]),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_metric_value() {
        let mut raw = raw_table();
        raw.rows[0][3] = "n/a".to_string();

        assert!(matches!(
            EfficiencyTable::from_raw(&raw),
            Err(MoneylineError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let raw = RawTable {
            rows: vec![],
            ..raw_table()
        };
        assert!(matches!(
            EfficiencyTable::from_raw(&raw),
            Err(MoneylineError::InsufficientRows { .. })
        ));
    }
}
