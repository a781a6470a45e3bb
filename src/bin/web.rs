use anyhow::{Context, Result};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use soccer_betting_ev::ev_analysis::{PickConfig, PickRecommendation};
use soccer_betting_ev::ev_calculator::{evaluate_match_result, normalize_implied_probabilities};
use soccer_betting_ev::{fetch_fixture_picks, Fixture, FootballApiClient, OutcomeRecord};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Custom filters for formatting
mod filters {
    use chrono::{DateTime, Utc};

    pub fn format_percent(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.1}%", value * 100.0))
    }

    pub fn format_odds(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", value))
    }

    pub fn format_ev(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:+.3}", value))
    }

    pub fn kickoff(value: &DateTime<Utc>) -> ::askama::Result<String> {
        Ok(value.format("%Y-%m-%d %H:%M").to_string())
    }
}

#[derive(Debug, Parser)]
#[command(name = "web", about = "Live soccer picks web page")]
struct Args {
    /// API-Football key; live pages are disabled without it
    #[arg(long, env = "API_FOOTBALL_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "WEB_ADDR", default_value = "127.0.0.1:3000")]
    addr: String,
}

#[derive(Template)]
#[template(path = "live.html")]
struct LiveTemplate {
    active_page: String,
    fixtures: Vec<Fixture>,
}

#[derive(Template)]
#[template(path = "fixture.html")]
struct FixtureTemplate {
    active_page: String,
    fixture: Fixture,
    min_probability: f64,
    picks: Vec<PickRecommendation>,
}

#[derive(Template)]
#[template(path = "calculator.html")]
struct CalculatorTemplate {
    active_page: String,
    home: String,
    draw: String,
    away: String,
    records: Vec<OutcomeRecord>,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

struct AppState {
    client: Option<FootballApiClient>,
}

type SharedState = Arc<AppState>;

fn missing_key() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "API-Football key not configured; only /calculator is available",
    )
        .into_response()
}

async fn live(State(state): State<SharedState>) -> Response {
    let Some(client) = state.client.as_ref() else {
        return missing_key();
    };

    match client.fetch_live_fixtures().await {
        Ok(fixtures) => HtmlTemplate(LiveTemplate {
            active_page: "live".to_string(),
            fixtures,
        })
        .into_response(),
        Err(e) => {
            error!("Error fetching live fixtures: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Error fetching live fixtures: {}", e),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PicksQuery {
    min_probability: Option<f64>,
    top: Option<usize>,
    bookmaker: Option<u32>,
}

async fn fixture(
    State(state): State<SharedState>,
    Path(fixture_id): Path<u64>,
    Query(query): Query<PicksQuery>,
) -> Response {
    let Some(client) = state.client.as_ref() else {
        return missing_key();
    };

    let defaults = PickConfig::default();
    let config = PickConfig {
        min_probability: query.min_probability.unwrap_or(defaults.min_probability),
        top_n: query.top.unwrap_or(defaults.top_n),
    };

    match fetch_fixture_picks(client, fixture_id, query.bookmaker, &config).await {
        Ok(result) => HtmlTemplate(FixtureTemplate {
            active_page: "live".to_string(),
            fixture: result.fixture,
            min_probability: config.min_probability,
            picks: result.picks,
        })
        .into_response(),
        Err(e) => {
            error!(fixture = fixture_id, "Error fetching picks: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Error fetching picks for fixture {}: {}", fixture_id, e),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct CalculatorQuery {
    home: Option<f64>,
    draw: Option<f64>,
    away: Option<f64>,
}

async fn calculator(Query(query): Query<CalculatorQuery>) -> Response {
    let field = |v: Option<f64>| v.map(|o| o.to_string()).unwrap_or_default();
    let mut template = CalculatorTemplate {
        active_page: "calculator".to_string(),
        home: field(query.home),
        draw: field(query.draw),
        away: field(query.away),
        records: Vec::new(),
    };

    if let (Some(home), Some(draw), Some(away)) = (query.home, query.draw, query.away) {
        match normalize_implied_probabilities(home, draw, away) {
            Ok((h, d, a)) => {
                template.records = evaluate_match_result([h, d, a], [home, draw, away]);
            }
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }

    HtmlTemplate(template).into_response()
}

/// A missing or blank key disables the live pages but keeps the calculator
fn build_state(api_key: Option<String>) -> Result<AppState> {
    let client = match api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => Some(FootballApiClient::new(key)?),
        None => {
            info!("API_FOOTBALL_KEY not set, serving the calculator only");
            None
        }
    };

    Ok(AppState { client })
}

fn app(state: SharedState) -> Router {
    Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(live))
        .route("/fixture/:id", get(fixture))
        .route("/calculator", get(calculator))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let state = Arc::new(build_state(args.api_key)?);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;

    info!("Starting web server at http://{}", args.addr);
    axum::serve(listener, app(state))
        .await
        .context("Web server stopped")?;

    Ok(())
}
