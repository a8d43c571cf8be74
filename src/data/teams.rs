//! Static NBA team directory
//!
//! Maps short team codes to the mascot names used to join the two data
//! sources, and to the stats provider's team identifiers.

use crate::{MoneylineError, Result};
use serde::{Deserialize, Serialize};

/// A team known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    /// Uppercase code, e.g. "BOS"
    pub code: String,
    /// Mascot, e.g. "Celtics"
    pub name: String,
    /// Stats provider team id
    pub provider_id: u32,
}

/// Immutable code -> team table, built once per run
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    entries: Vec<TeamEntry>,
}

const NBA_TEAMS: [(&str, &str, u32); 30] = [
    ("ATL", "Hawks", 1610612737),
    ("BOS", "Celtics", 1610612738),
    ("BKN", "Nets", 1610612751),
    ("CHA", "Hornets", 1610612766),
    ("CHI", "Bulls", 1610612741),
    ("CLE", "Cavaliers", 1610612739),
    ("DAL", "Mavericks", 1610612742),
    ("DEN", "Nuggets", 1610612743),
    ("DET", "Pistons", 1610612765),
    ("GSW", "Warriors", 1610612744),
    ("HOU", "Rockets", 1610612745),
    ("IND", "Pacers", 1610612754),
    ("LAC", "Clippers", 1610612746),
    ("LAL", "Lakers", 1610612747),
    ("MEM", "Grizzlies", 1610612763),
    ("MIA", "Heat", 1610612748),
    ("MIL", "Bucks", 1610612749),
    ("MIN", "Timberwolves", 1610612750),
    ("NOP", "Pelicans", 1610612740),
    ("NYK", "Knicks", 1610612752),
    ("OKC", "Thunder", 1610612760),
    ("ORL", "Magic", 1610612753),
    ("PHI", "76ers", 1610612755),
    ("PHX", "Suns", 1610612756),
    ("POR", "Blazers", 1610612757),
    ("SAC", "Kings", 1610612758),
    ("SAS", "Spurs", 1610612759),
    ("TOR", "Raptors", 1610612761),
    ("UTA", "Jazz", 1610612762),
    ("WAS", "Wizards", 1610612764),
];

impl Default for TeamDirectory {
    fn default() -> Self {
        Self::nba()
    }
}

impl TeamDirectory {
    /// The current 30 NBA franchises
    pub fn nba() -> Self {
        let entries = NBA_TEAMS
            .iter()
            .map(|(code, name, id)| TeamEntry {
                code: code.to_string(),
                name: name.to_string(),
                provider_id: *id,
            })
            .collect();

        TeamDirectory { entries }
    }

    /// Build a directory from custom entries. Codes are stored uppercase; duplicates are rejected.
    pub fn from_entries(entries: Vec<TeamEntry>) -> Result<Self> {
        let mut normalized: Vec<TeamEntry> = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.code = entry.code.trim().to_uppercase();
            if normalized.iter().any(|e| e.code == entry.code) {
                return Err(MoneylineError::Config(format!(
                    "Duplicate team code: {}",
                    entry.code
                )));
            }
            normalized.push(entry);
        }
        Ok(TeamDirectory {
            entries: normalized,
        })
    }

    /// Look up a team by code, ignoring case
    pub fn get(&self, code: &str) -> Option<&TeamEntry> {
        let code = code.trim();
        self.entries
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(code))
    }

    /// Resolve a code, surfacing an unknown code as a typed error
    pub fn resolve(&self, code: &str) -> Result<&TeamEntry> {
        self.get(code)
            .ok_or_else(|| MoneylineError::UnknownTeam(code.to_string()))
    }

    /// Mascot for a code
    pub fn name(&self, code: &str) -> Result<&str> {
        self.resolve(code).map(|e| e.name.as_str())
    }

    /// Stats provider id for a code
    pub fn provider_id(&self, code: &str) -> Result<u32> {
        self.resolve(code).map(|e| e.provider_id)
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
