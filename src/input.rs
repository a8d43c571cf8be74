//! Interactive collection of matchup details and odds

use crate::data::TeamDirectory;
use crate::predict::MoneylineOdds;
use crate::{MoneylineError, Result, Venue};
use std::io::{BufRead, Write};

const RETRY_MESSAGE: &str = "Error, try again";

/// Ask `question` until `parse` accepts the trimmed answer.
///
/// Rejected answers print a retry message and ask again. End of input is an
/// error rather than a silent default.
pub fn prompt_until<R, W, T, F>(input: &mut R, output: &mut W, question: &str, parse: F) -> Result<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<T>,
{
    loop {
        write!(output, "{}", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(MoneylineError::InvalidInput(format!(
                "input closed while waiting for {:?}",
                question.trim()
            )));
        }

        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::debug!("Rejected {:?}: {}", line.trim(), e);
                writeln!(output, "{}", RETRY_MESSAGE)?;
            }
        }
    }
}

/// Prompts for whatever the command line left out
pub struct Prompter<'a, R, W> {
    input: R,
    output: W,
    teams: &'a TeamDirectory,
}

impl<'a, R: BufRead, W: Write> Prompter<'a, R, W> {
    pub fn new(input: R, output: W, teams: &'a TeamDirectory) -> Self {
        Prompter {
            input,
            output,
            teams,
        }
    }

    /// Known team code, returned uppercase
    pub fn team(&mut self, given: Option<String>) -> Result<String> {
        let teams = self.teams;
        self.field(given, "Enter betting team abbreviation: ", |s| {
            teams.resolve(s).map(|e| e.code.clone())
        })
    }

    /// Known team code other than `team`
    pub fn opponent(&mut self, given: Option<String>, team: &str) -> Result<String> {
        let teams = self.teams;
        self.field(given, "Enter opposing team abbreviation: ", |s| {
            let code = teams.resolve(s)?.code.clone();
            if code.eq_ignore_ascii_case(team) {
                return Err(MoneylineError::InvalidInput(format!(
                    "{} cannot play itself",
                    code
                )));
            }
            Ok(code)
        })
    }

    pub fn venue(&mut self, given: Option<String>) -> Result<Venue> {
        self.field(given, "Enter betting team home or away: ", str::parse)
    }

    pub fn odds(&mut self, given: Option<String>) -> Result<MoneylineOdds> {
        self.field(given, "Enter moneyline odds: ", str::parse)
    }

    /// Validate a command line value, or prompt when it is absent.
    ///
    /// A value given on the command line is not re-prompted: an invalid one
    /// is an error.
    fn field<T, F>(&mut self, given: Option<String>, question: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T>,
    {
        match given {
            Some(value) => parse(value.trim()),
            None => prompt_until(&mut self.input, &mut self.output, question, parse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_retries_until_valid() {
        let mut input = Cursor::new("+-120\n120\n-120\n");
        let mut output = Vec::new();

        let odds: MoneylineOdds =
            prompt_until(&mut input, &mut output, "Odds: ", str::parse).unwrap();

        assert_eq!(odds.to_string(), "-120");
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches(RETRY_MESSAGE).count(), 2);
        assert_eq!(shown.matches("Odds: ").count(), 3);
    }

    #[test]
    fn test_prompt_end_of_input() {
        let mut input = Cursor::new("neutral\n");
        let mut output = Vec::new();

        let result: Result<Venue> = prompt_until(&mut input, &mut output, "Venue: ", str::parse);
        assert!(matches!(result, Err(MoneylineError::InvalidInput(_))));
    }

    #[test]
    fn test_prompter_fills_missing_fields() {
        let teams = TeamDirectory::nba();
        let input = Cursor::new("sea\nbos\nnyk\nHome\n");
        let mut prompter = Prompter::new(input, Vec::new(), &teams);

        let team = prompter.team(None).unwrap();
        assert_eq!(team, "BOS");

        let opponent = prompter.opponent(None, &team).unwrap();
        assert_eq!(opponent, "NYK");

        assert_eq!(prompter.venue(None).unwrap(), Venue::Home);
        assert_eq!(
            prompter.odds(Some("+150".to_string())).unwrap().to_string(),
            "+150"
        );
    }

    #[test]
    fn test_opponent_cannot_be_team() {
        let teams = TeamDirectory::nba();
        let input = Cursor::new("BOS\nmia\n");
        let mut prompter = Prompter::new(input, Vec::new(), &teams);

        assert_eq!(prompter.opponent(None, "BOS").unwrap(), "MIA");
    }

    #[test]
    fn test_invalid_argument_is_an_error() {
        let teams = TeamDirectory::nba();
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new(), &teams);

        assert!(matches!(
            prompter.team(Some("SEA".to_string())),
            Err(MoneylineError::UnknownTeam(_))
        ));
        assert!(prompter.odds(Some("150".to_string())).is_err());
    }
}
