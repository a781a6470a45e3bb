use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side of a three-way (1X2) market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Fixed evaluation order for 1X2 markets
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away",
        }
    }
}

/// A labelled outcome with its probability, decimal odds and expected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub label: String,
    pub probability: f64,    // Between 0 and 1
    pub odds: f64,           // Decimal odds (e.g. 1.85)
    pub expected_value: f64, // probability * odds - 1
}

/// Probability estimate for a single-selection market (over/under, BTTS)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub probability: f64,
    pub expected_value: f64,
}

/// A soccer match as reported by API-Football
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub date: DateTime<Utc>,
    pub status: String, // Short status code, e.g. "1H", "HT", "NS"
    pub elapsed: Option<u32>,
    pub league: String,
    pub country: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Current score, if the match has started
    pub fn score(&self) -> Option<String> {
        match (self.home_goals, self.away_goals) {
            (Some(home), Some(away)) => Some(format!("{}-{}", home, away)),
            _ => None,
        }
    }
}

/// A single priced selection within a bookmaker market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsPrice {
    pub label: String,
    pub odds: f64,
}

/// One bookmaker's prices for one market of a fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsOffer {
    pub fixture_id: u64,
    pub bookmaker: String,
    pub market: String,
    pub prices: Vec<OddsPrice>,
}

impl OddsOffer {
    /// Look up the odds for a selection label, ignoring case
    pub fn price(&self, label: &str) -> Option<f64> {
        self.prices
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
            .map(|p| p.odds)
    }
}
