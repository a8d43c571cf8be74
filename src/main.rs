//! NBA moneyline value CLI
//!
//! Estimates a team's win probability for an upcoming game and compares it
//! with the bookmaker's moneyline price.

use clap::{Parser, Subcommand};
use moneyline::{Config, Result};

#[derive(Parser)]
#[command(name = "moneyline")]
#[command(about = "Find value in NBA moneyline odds", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the win probability and compare it with the odds
    Predict {
        #[command(flatten)]
        matchup: MatchupArgs,
        /// Moneyline odds for the betting team, e.g. -150 or +130
        #[arg(long, allow_hyphen_values = true)]
        odds: Option<String>,
        /// Output format
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },
    /// Fit on the leading 90% of the game log and score the rest
    Evaluate {
        #[command(flatten)]
        matchup: MatchupArgs,
        /// Output format
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },
    /// Show the probability implied by moneyline odds
    Odds {
        /// Odds such as -200 or +150
        #[arg(allow_hyphen_values = true)]
        odds: String,
    },
    /// List known team codes
    Teams,
    /// Write a default config file
    Init,
}

/// Matchup details; anything omitted is prompted for
#[derive(clap::Args)]
struct MatchupArgs {
    /// Betting team code, e.g. BOS
    #[arg(long)]
    team: Option<String>,
    /// Opposing team code
    #[arg(long)]
    opponent: Option<String>,
    /// Betting team venue: home or away
    #[arg(long)]
    venue: Option<String>,
    /// Read the game log from a saved leaguegamefinder response
    #[arg(long)]
    games_json: Option<String>,
    /// Read ratings from a saved season page
    #[arg(long)]
    efficiency_html: Option<String>,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Plain,
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(OutputFormat::Plain),
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use plain, table, or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Predict {
            matchup,
            odds,
            format,
        } => commands::predict(&config, matchup, odds, format),
        Commands::Evaluate { matchup, format } => commands::evaluate(&config, matchup, format),
        Commands::Odds { odds } => commands::odds(&odds),
        Commands::Teams => commands::teams(),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use moneyline::data::scrapers::{
        BasketballReferenceClient, EfficiencySource, GameFinderFile, GameSource, NbaStatsClient,
        SeasonPageFile,
    };
    use moneyline::data::TeamDirectory;
    use moneyline::features::FeatureTable;
    use moneyline::input::Prompter;
    use moneyline::predict::{format_report, Estimator, Matchup, MoneylineOdds, Pipeline, ValueReport};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Edit {} to pick the season and model settings", config_path);
        println!("  2. Run 'moneyline predict' and answer the prompts");
        println!("  3. Run 'moneyline evaluate --team BOS' to check holdout accuracy");

        Ok(())
    }

    pub fn teams() -> Result<()> {
        let teams = TeamDirectory::nba();

        println!("Teams ({})", teams.len());
        println!("───────────────────────────────");
        for team in teams.iter() {
            println!("  {}  {}", team.code, team.name);
        }

        Ok(())
    }

    pub fn odds(odds: &str) -> Result<()> {
        let odds: MoneylineOdds = odds.parse()?;
        println!("Book probability: {}", odds.implied_probability());
        Ok(())
    }

    pub fn predict(
        config: &Config,
        args: MatchupArgs,
        odds: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let teams = TeamDirectory::nba();
        let mut prompter = Prompter::new(std::io::stdin().lock(), std::io::stdout(), &teams);

        let team = prompter.team(args.team.clone())?;
        let opponent = prompter.opponent(args.opponent.clone(), &team)?;
        let venue = prompter.venue(args.venue.clone())?;
        let odds = prompter.odds(odds)?;

        let matchup = Matchup {
            team,
            opponent,
            venue,
        };
        let table = feature_table(config, &teams, &matchup, &args)?;
        let estimate = Estimator::new(config.model.clone()).estimate(&table)?;

        let report = ValueReport::new(
            &matchup.team,
            &table.upcoming().opponent,
            venue,
            odds,
            &estimate,
        );

        match format {
            OutputFormat::Plain => println!("{}", report),
            OutputFormat::Table => print!("{}", format_report(&report)),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "report": report,
                    "estimate": estimate,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }

        Ok(())
    }

    pub fn evaluate(config: &Config, args: MatchupArgs, format: OutputFormat) -> Result<()> {
        let teams = TeamDirectory::nba();
        let mut prompter = Prompter::new(std::io::stdin().lock(), std::io::stdout(), &teams);

        let team = prompter.team(args.team.clone())?;
        let opponent = prompter.opponent(args.opponent.clone(), &team)?;
        let venue = prompter.venue(args.venue.clone())?;

        let matchup = Matchup {
            team,
            opponent,
            venue,
        };
        let table = feature_table(config, &teams, &matchup, &args)?;
        let metrics = Estimator::new(config.model.clone()).evaluate(&table)?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
            OutputFormat::Plain | OutputFormat::Table => {
                println!("Holdout evaluation for {}", matchup.team);
                println!("───────────────────────────────");
                println!("  Games:     {}", metrics.total);
                println!("  Accuracy:  {:.1}%", metrics.accuracy() * 100.0);
                println!("  Log loss:  {:.4}", metrics.log_loss());
                println!("  Brier:     {:.4}", metrics.brier());
            }
        }

        Ok(())
    }

    /// Run the pipeline against saved files where given, the network otherwise
    fn feature_table(
        config: &Config,
        teams: &TeamDirectory,
        matchup: &Matchup,
        args: &MatchupArgs,
    ) -> Result<FeatureTable> {
        let games: Box<dyn GameSource> = match &args.games_json {
            Some(path) => Box::new(GameFinderFile::new(path)),
            None => Box::new(NbaStatsClient::new(&config.data)?),
        };
        let efficiency: Box<dyn EfficiencySource> = match &args.efficiency_html {
            Some(path) => Box::new(SeasonPageFile::new(path)),
            None => Box::new(BasketballReferenceClient::new(config)?),
        };

        Pipeline::new(config, teams).feature_table(matchup, games.as_ref(), efficiency.as_ref())
    }
}
