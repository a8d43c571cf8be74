//! American moneyline odds

use crate::{MoneylineError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A moneyline price such as `+150` or `-200`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoneylineOdds {
    /// `+` prices pay out more than the stake
    pub underdog: bool,
    pub magnitude: u64,
}

impl MoneylineOdds {
    /// Probability implied by the price, assuming no bookmaker margin, to 3 decimals
    pub fn implied_probability(&self) -> f64 {
        let n = self.magnitude as f64;
        let p = if self.underdog {
            100.0 / (n + 100.0)
        } else {
            n / (n + 100.0)
        };
        (p * 1000.0).round() / 1000.0
    }
}

impl FromStr for MoneylineOdds {
    type Err = MoneylineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            MoneylineError::InvalidInput(format!(
                "odds must be + or - followed by digits, got {:?}",
                s
            ))
        };

        let (underdog, digits) = match s.as_bytes().first() {
            Some(b'+') => (true, &s[1..]),
            Some(b'-') => (false, &s[1..]),
            _ => return Err(invalid()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude = digits.parse().map_err(|_| invalid())?;

        Ok(MoneylineOdds {
            underdog,
            magnitude,
        })
    }
}

impl fmt::Display for MoneylineOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.underdog { '+' } else { '-' };
        write!(f, "{}{}", sign, self.magnitude)
    }
}

/// Whether `s` is well-formed moneyline odds
pub fn is_valid_odds(s: &str) -> bool {
    s.parse::<MoneylineOdds>().is_ok()
}

/// Implied probability of an odds string
pub fn implied_probability(s: &str) -> Result<f64> {
    Ok(s.parse::<MoneylineOdds>()?.implied_probability())
}
