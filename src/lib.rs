pub mod api;
pub mod models;
pub mod utils;

pub use api::*;
pub use models::*;
pub use utils::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use utils::ev_analysis::{find_top_match_winner_picks, PickConfig, PickRecommendation};

/// A fixture together with its best 1X2 picks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixturePicks {
    pub fixture: Fixture,
    pub picks: Vec<PickRecommendation>,
}

/// Fetch a fixture and its odds, then select the top match winner picks
pub async fn fetch_fixture_picks(
    client: &FootballApiClient,
    fixture_id: u64,
    bookmaker: Option<u32>,
    config: &PickConfig,
) -> Result<FixturePicks> {
    let fixture = client
        .fetch_fixture(fixture_id)
        .await
        .context("Failed to fetch fixture")?
        .with_context(|| format!("Fixture {} not found", fixture_id))?;

    let offers = client
        .fetch_odds_for_fixture(fixture_id, bookmaker)
        .await
        .context("Failed to fetch odds")?;

    let picks = find_top_match_winner_picks(&fixture, &offers, config);
    info!(
        fixture = fixture_id,
        offers = offers.len(),
        picks = picks.len(),
        "Selected picks for {}",
        fixture.title()
    );

    Ok(FixturePicks { fixture, picks })
}
