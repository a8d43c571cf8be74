//! Remote data fetchers
//!
//! Game logs come from the NBA stats API, season efficiency ratings from
//! the Basketball Reference season page. Both can also be read from files.

pub mod basketball_reference;
pub mod nba_stats;

pub use basketball_reference::{BasketballReferenceClient, RawTable, SeasonPageFile};
pub use nba_stats::{GameFinderFile, NbaStatsClient, RawGame};

use crate::{DataSource, MoneylineError, Result};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of a team's historical games, newest first
pub trait GameSource {
    fn source(&self) -> DataSource;

    /// Fetch regular-season games for the team with this provider id
    fn fetch_games(&self, provider_id: u32) -> Result<Vec<RawGame>>;
}

/// Source of the raw season efficiency table
pub trait EfficiencySource {
    fn source(&self) -> DataSource;

    fn fetch_table(&self) -> Result<RawTable>;
}

/// Blocking HTTP client with a request timeout
pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Retry an operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                log::warn!("Attempt {} failed: {}", attempt, e);
                if attempt >= max_attempts {
                    return Err(e);
                }
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                std::thread::sleep(delay);
            }
        }
    }
}

/// Fetch a URL as text, treating non-success statuses as errors
pub(crate) fn get_text(
    request: reqwest::blocking::RequestBuilder,
    data_source: DataSource,
) -> Result<String> {
    let response = request.send()?;
    if !response.status().is_success() {
        return Err(MoneylineError::Fetch {
            data_source,
            message: format!("HTTP {}: {}", response.status(), response.url()),
        });
    }
    Ok(response.text()?)
}
