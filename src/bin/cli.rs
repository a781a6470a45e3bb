use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use soccer_betting_ev::ev_analysis::{top_picks, PickConfig};
use soccer_betting_ev::ev_calculator::{
    estimate_btts, estimate_over_under, evaluate_match_result, normalize_implied_probabilities,
};
use soccer_betting_ev::{fetch_fixture_picks, Fixture, FootballApiClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cli", about = "Soccer betting probability and EV calculator")]
struct Cli {
    /// API-Football key, required for commands that fetch data
    #[arg(long, env = "API_FOOTBALL_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List fixtures currently in play
    Live,
    /// List the fixtures of a league season
    Fixtures {
        #[arg(long)]
        league: u32,
        #[arg(long)]
        season: u32,
    },
    /// Show the most likely match winner outcomes for a fixture
    Picks {
        #[arg(long)]
        fixture: u64,
        /// Restrict odds to one bookmaker id
        #[arg(long)]
        bookmaker: Option<u32>,
        #[arg(long, default_value_t = PickConfig::default().min_probability)]
        min_probability: f64,
        #[arg(long, default_value_t = PickConfig::default().top_n)]
        top: usize,
    },
    /// Convert home/draw/away odds into margin-free probabilities
    Normalize {
        #[arg(allow_negative_numbers = true)]
        home: f64,
        #[arg(allow_negative_numbers = true)]
        draw: f64,
        #[arg(allow_negative_numbers = true)]
        away: f64,
    },
    /// Normalize home/draw/away odds and show probability and EV per outcome
    MatchResult {
        #[arg(allow_negative_numbers = true)]
        home: f64,
        #[arg(allow_negative_numbers = true)]
        draw: f64,
        #[arg(allow_negative_numbers = true)]
        away: f64,
        #[arg(long, default_value_t = 0.0)]
        min_probability: f64,
        #[arg(long, default_value_t = 3)]
        top: usize,
    },
    /// Estimate over 2.5 goals probability and EV
    OverUnder {
        /// Base scoring percentage (0-100)
        #[arg(long, allow_negative_numbers = true)]
        percentage: f64,
        /// Home team average goals per match
        #[arg(long)]
        goals_home: f64,
        /// Away team average goals per match
        #[arg(long)]
        goals_away: f64,
        #[arg(long, allow_negative_numbers = true)]
        odds: f64,
        /// Key attacking players are missing
        #[arg(long)]
        players_missing: bool,
    },
    /// Estimate both teams to score probability and EV
    Btts {
        #[arg(long, allow_negative_numbers = true)]
        home_percentage: f64,
        #[arg(long, allow_negative_numbers = true)]
        away_percentage: f64,
        #[arg(long, allow_negative_numbers = true)]
        odds: f64,
        /// A key attacker is missing
        #[arg(long)]
        attacker_missing: bool,
        /// At least one side has a strong defense
        #[arg(long)]
        strong_defense: bool,
    },
}

fn api_client(api_key: Option<String>) -> Result<FootballApiClient> {
    FootballApiClient::new(api_key.unwrap_or_default())
}

fn print_fixtures(fixtures: &[Fixture]) {
    for fixture in fixtures {
        let progress = match (fixture.score(), fixture.elapsed) {
            (Some(score), Some(minute)) => format!("{} ({}')", score, minute),
            (Some(score), None) => score,
            _ => fixture.status.clone(),
        };
        println!(
            "[{}] {} | {} | {} | {}",
            fixture.id,
            fixture.title(),
            fixture.league,
            fixture.date.format("%Y-%m-%d %H:%M"),
            progress
        );
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Live => {
            let client = api_client(cli.api_key)?;
            let fixtures = client
                .fetch_live_fixtures()
                .await
                .context("Failed to fetch live fixtures")?;

            if fixtures.is_empty() {
                println!("No fixtures in play right now.");
            } else {
                println!("{} Live Fixtures:\n", fixtures.len());
                print_fixtures(&fixtures);
            }
        }
        Command::Fixtures { league, season } => {
            let client = api_client(cli.api_key)?;
            let fixtures = client
                .fetch_upcoming_fixtures(league, season)
                .await
                .context("Failed to fetch league fixtures")?;

            if fixtures.is_empty() {
                println!("No fixtures found for league {} season {}.", league, season);
            } else {
                print_fixtures(&fixtures);
            }
        }
        Command::Picks {
            fixture,
            bookmaker,
            min_probability,
            top,
        } => {
            let client = api_client(cli.api_key)?;
            let config = PickConfig {
                min_probability,
                top_n: top,
            };
            let result = fetch_fixture_picks(&client, fixture, bookmaker, &config).await?;

            println!("{}\n", result.fixture.title());
            if result.picks.is_empty() {
                println!(
                    "No match winner bets with probability >= {:.0}% for this fixture.",
                    min_probability * 100.0
                );
            } else {
                println!(
                    "Top {} match winner bets (>= {:.0}% probability):\n",
                    result.picks.len(),
                    min_probability * 100.0
                );
                for (i, pick) in result.picks.iter().enumerate() {
                    println!("{}. {}", i + 1, pick.format());
                }
            }
        }
        Command::Normalize { home, draw, away } => {
            let (h, d, a) = normalize_implied_probabilities(home, draw, away)?;
            println!("Home: {:.4}", h);
            println!("Draw: {:.4}", d);
            println!("Away: {:.4}", a);
        }
        Command::MatchResult {
            home,
            draw,
            away,
            min_probability,
            top,
        } => {
            let (h, d, a) = normalize_implied_probabilities(home, draw, away)?;
            let records = evaluate_match_result([h, d, a], [home, draw, away]);
            for record in top_picks(records, min_probability, top) {
                println!(
                    "{}: {:.1}% | Odds={:.2} | EV={:+.3}",
                    record.label,
                    record.probability * 100.0,
                    record.odds,
                    record.expected_value
                );
            }
        }
        Command::OverUnder {
            percentage,
            goals_home,
            goals_away,
            odds,
            players_missing,
        } => {
            let estimate =
                estimate_over_under(percentage, goals_home, goals_away, odds, players_missing)?;
            println!(
                "Over 2.5 goals: {:.1}% | Odds={:.2} | EV={:+.3}",
                estimate.probability * 100.0,
                odds,
                estimate.expected_value
            );
        }
        Command::Btts {
            home_percentage,
            away_percentage,
            odds,
            attacker_missing,
            strong_defense,
        } => {
            let estimate = estimate_btts(
                home_percentage,
                away_percentage,
                odds,
                attacker_missing,
                strong_defense,
            )?;
            println!(
                "Both teams to score: {:.1}% | Odds={:.2} | EV={:+.3}",
                estimate.probability * 100.0,
                odds,
                estimate.expected_value
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging on stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
