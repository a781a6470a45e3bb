use crate::models::{Fixture, OddsOffer, OddsPrice};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const API_FOOTBALL_BASE_URL: &str = "https://v3.football.api-sports.io";
const API_KEY_HEADER: &str = "x-apisports-key";
const REMAINING_HEADER: &str = "x-ratelimit-requests-remaining";

/// Every API-Football response is wrapped in this envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    // Either an empty list or an object keyed by error name
    #[serde(default)]
    errors: serde_json::Value,
    #[serde(default = "Vec::new")]
    response: Vec<T>,
}

/// Fixture entry from the /fixtures endpoint
#[derive(Debug, Deserialize)]
struct ApiFixtureItem {
    fixture: ApiFixture,
    league: ApiLeague,
    teams: ApiTeams,
    #[serde(default)]
    goals: ApiGoals,
}

#[derive(Debug, Deserialize)]
struct ApiFixture {
    id: u64,
    date: DateTime<Utc>,
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    short: String,
    elapsed: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiLeague {
    name: String,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTeams {
    home: ApiTeam,
    away: ApiTeam,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiGoals {
    home: Option<u32>,
    away: Option<u32>,
}

/// Odds entry from the /odds endpoint
#[derive(Debug, Deserialize)]
struct ApiOddsItem {
    fixture: ApiOddsFixture,
    #[serde(default)]
    bookmakers: Vec<ApiBookmaker>,
}

#[derive(Debug, Deserialize)]
struct ApiOddsFixture {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct ApiBookmaker {
    name: String,
    #[serde(default)]
    bets: Vec<ApiBet>,
}

/// A market (e.g. "Match Winner", "Goals Over/Under") offered by a bookmaker
#[derive(Debug, Deserialize)]
struct ApiBet {
    name: String,
    #[serde(default)]
    values: Vec<ApiBetValue>,
}

#[derive(Debug, Deserialize)]
struct ApiBetValue {
    value: String,
    odd: ApiOdd,
}

/// Odds arrive as decimal strings ("1.85"), occasionally as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiOdd {
    Text(String),
    Number(f64),
}

impl ApiOdd {
    fn to_decimal(&self) -> Option<f64> {
        match self {
            ApiOdd::Text(s) => s.trim().parse().ok(),
            ApiOdd::Number(n) => Some(*n),
        }
    }
}

fn has_errors(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Null => false,
        serde_json::Value::Array(list) => !list.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).context("Failed to parse API-Football response")?;

    if has_errors(&envelope.errors) {
        anyhow::bail!("API-Football returned errors: {}", envelope.errors);
    }

    Ok(envelope.response)
}

/// Parse a /fixtures response body into fixtures
pub fn parse_fixtures_response(body: &str) -> Result<Vec<Fixture>> {
    let items: Vec<ApiFixtureItem> = parse_envelope(body)?;

    Ok(items
        .into_iter()
        .map(|item| Fixture {
            id: item.fixture.id,
            date: item.fixture.date,
            status: item.fixture.status.short,
            elapsed: item.fixture.status.elapsed,
            league: item.league.name,
            country: item.league.country,
            home_team: item.teams.home.name,
            away_team: item.teams.away.name,
            home_goals: item.goals.home,
            away_goals: item.goals.away,
        })
        .collect())
}

/// Parse an /odds response body into one offer per bookmaker market
pub fn parse_odds_response(body: &str) -> Result<Vec<OddsOffer>> {
    let items: Vec<ApiOddsItem> = parse_envelope(body)?;
    let mut offers = Vec::new();

    for item in items {
        for bookmaker in item.bookmakers {
            for bet in bookmaker.bets {
                let prices: Vec<OddsPrice> = bet
                    .values
                    .iter()
                    .filter_map(|v| match v.odd.to_decimal() {
                        Some(odds) => Some(OddsPrice {
                            label: v.value.clone(),
                            odds,
                        }),
                        None => {
                            warn!(
                                fixture = item.fixture.id,
                                bookmaker = %bookmaker.name,
                                market = %bet.name,
                                "Dropping unparsable odds for {}: {:?}",
                                v.value,
                                v.odd
                            );
                            None
                        }
                    })
                    .collect();

                offers.push(OddsOffer {
                    fixture_id: item.fixture.id,
                    bookmaker: bookmaker.name.clone(),
                    market: bet.name,
                    prices,
                });
            }
        }
    }

    Ok(offers)
}

pub struct FootballApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl FootballApiClient {
    /// Create a client for API-Football; the key is required up front
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, API_FOOTBALL_BASE_URL)
    }

    /// Create a client against another API-Football host, e.g. a proxy
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            anyhow::bail!("Missing API-Football key: pass it explicitly or set API_FOOTBALL_KEY");
        }

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, ?params, "Requesting API-Football");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to call API-Football {}", endpoint))?;

        if !response.status().is_success() {
            anyhow::bail!("API-Football returned error: {}", response.status());
        }

        if let Some(remaining) = response.headers().get(REMAINING_HEADER) {
            debug!("API-Football requests remaining: {:?}", remaining);
        }

        response
            .text()
            .await
            .context("Failed to read API-Football response")
    }

    /// Fetch all fixtures currently in play
    pub async fn fetch_live_fixtures(&self) -> Result<Vec<Fixture>> {
        let body = self.get("/fixtures", &[("live", "all".to_string())]).await?;
        parse_fixtures_response(&body)
    }

    /// Fetch the fixtures of a league season
    pub async fn fetch_upcoming_fixtures(&self, league_id: u32, season: u32) -> Result<Vec<Fixture>> {
        let body = self
            .get(
                "/fixtures",
                &[
                    ("league", league_id.to_string()),
                    ("season", season.to_string()),
                ],
            )
            .await?;
        parse_fixtures_response(&body)
    }

    /// Fetch a single fixture by id
    pub async fn fetch_fixture(&self, fixture_id: u64) -> Result<Option<Fixture>> {
        let body = self
            .get("/fixtures", &[("id", fixture_id.to_string())])
            .await?;
        Ok(parse_fixtures_response(&body)?.into_iter().next())
    }

    /// Fetch odds for a fixture, optionally restricted to one bookmaker id
    pub async fn fetch_odds_for_fixture(
        &self,
        fixture_id: u64,
        bookmaker: Option<u32>,
    ) -> Result<Vec<OddsOffer>> {
        let mut params = vec![("fixture", fixture_id.to_string())];
        if let Some(bookmaker) = bookmaker {
            params.push(("bookmaker", bookmaker.to_string()));
        }

        let body = self.get("/odds", &params).await?;
        parse_odds_response(&body)
    }
}
