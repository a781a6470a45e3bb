use crate::models::{Fixture, OddsOffer, Outcome, OutcomeRecord};
use crate::utils::ev_calculator::{evaluate_match_result, normalize_implied_probabilities};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bet names API-Football uses for the three-way result market
const MATCH_WINNER_MARKETS: [&str; 2] = ["Match Winner", "1X2"];

/// Selection criteria for picks shown to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PickConfig {
    pub min_probability: f64,
    pub top_n: usize,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            min_probability: 0.80,
            top_n: 3,
        }
    }
}

/// A 1X2 outcome from one bookmaker that passed the probability threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRecommendation {
    pub fixture_id: u64,
    pub home_team: String,
    pub away_team: String,
    pub bookmaker: String,
    pub label: String,
    pub probability: f64,
    pub odds: f64,
    pub expected_value: f64,
}

impl PickRecommendation {
    /// Format the pick as a readable string
    pub fn format(&self) -> String {
        format!(
            "{}: {:.1}% | Odds={:.2} | EV={:+.2} ({})",
            self.label,
            self.probability * 100.0,
            self.odds,
            self.expected_value,
            self.bookmaker
        )
    }
}

/// Keep items at or above `min_probability`, most likely first, at most `top_n`
fn select_top<T>(
    items: Vec<T>,
    min_probability: f64,
    top_n: usize,
    probability: impl Fn(&T) -> f64,
) -> Vec<T> {
    let mut picks: Vec<T> = items
        .into_iter()
        .filter(|item| probability(item) >= min_probability)
        .collect();

    // Stable sort keeps input order for equal probabilities
    picks.sort_by(|a, b| {
        probability(b)
            .partial_cmp(&probability(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    picks.truncate(top_n);
    picks
}

/// Keep records at or above `min_probability`, most likely first, at most `top_n`
pub fn top_picks(
    records: Vec<OutcomeRecord>,
    min_probability: f64,
    top_n: usize,
) -> Vec<OutcomeRecord> {
    select_top(records, min_probability, top_n, |r| r.probability)
}

/// Read home/draw/away odds from a match winner offer.
///
/// API-Football labels the selections "Home"/"Draw"/"Away", some bookmakers
/// use the team names instead; both are accepted.
pub fn match_winner_prices(fixture: &Fixture, offer: &OddsOffer) -> Option<[f64; 3]> {
    if !MATCH_WINNER_MARKETS
        .iter()
        .any(|m| offer.market.eq_ignore_ascii_case(m))
    {
        return None;
    }

    let home = offer
        .price(Outcome::Home.label())
        .or_else(|| offer.price(&fixture.home_team))?;
    let draw = offer.price(Outcome::Draw.label())?;
    let away = offer
        .price(Outcome::Away.label())
        .or_else(|| offer.price(&fixture.away_team))?;

    Some([home, draw, away])
}

/// Evaluate every match winner offer for a fixture and return the top picks
/// across all bookmakers
pub fn find_top_match_winner_picks(
    fixture: &Fixture,
    offers: &[OddsOffer],
    config: &PickConfig,
) -> Vec<PickRecommendation> {
    let mut all_picks = Vec::new();

    for offer in offers {
        let Some(odds) = match_winner_prices(fixture, offer) else {
            continue;
        };

        let (home, draw, away) = match normalize_implied_probabilities(odds[0], odds[1], odds[2]) {
            Ok(probs) => probs,
            Err(e) => {
                warn!(
                    fixture = fixture.id,
                    bookmaker = %offer.bookmaker,
                    "Skipping offer: {}",
                    e
                );
                continue;
            }
        };

        let records = evaluate_match_result([home, draw, away], odds);
        for (outcome, record) in Outcome::ALL.iter().zip(records) {
            let label = match outcome {
                Outcome::Home => fixture.home_team.clone(),
                Outcome::Draw => "Draw".to_string(),
                Outcome::Away => fixture.away_team.clone(),
            };

            all_picks.push((
                offer.bookmaker.clone(),
                OutcomeRecord { label, ..record },
            ));
        }
    }

    debug!(
        fixture = fixture.id,
        evaluated = all_picks.len(),
        "Evaluated match winner outcomes"
    );

    let picks: Vec<PickRecommendation> = all_picks
        .into_iter()
        .map(|(bookmaker, r)| PickRecommendation {
            fixture_id: fixture.id,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            bookmaker,
            label: r.label,
            probability: r.probability,
            odds: r.odds,
            expected_value: r.expected_value,
        })
        .collect();

    select_top(picks, config.min_probability, config.top_n, |p| p.probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OddsPrice;
    use chrono::Utc;

    fn fixture() -> Fixture {
        Fixture {
            id: 868_549,
            date: Utc::now(),
            status: "1H".to_string(),
            elapsed: Some(23),
            league: "Premier League".to_string(),
            country: Some("England".to_string()),
            home_team: "Arsenal".to_string(),
            away_team: "Luton".to_string(),
            home_goals: Some(1),
            away_goals: Some(0),
        }
    }

    fn offer(bookmaker: &str, market: &str, prices: &[(&str, f64)]) -> OddsOffer {
        OddsOffer {
            fixture_id: 868_549,
            bookmaker: bookmaker.to_string(),
            market: market.to_string(),
            prices: prices
                .iter()
                .map(|(label, odds)| OddsPrice {
                    label: label.to_string(),
                    odds: *odds,
                })
                .collect(),
        }
    }

    fn record(label: &str, probability: f64) -> OutcomeRecord {
        OutcomeRecord {
            label: label.to_string(),
            probability,
            odds: 1.5,
            expected_value: probability * 1.5 - 1.0,
        }
    }

    #[test]
    fn test_top_picks_filters_sorts_and_truncates() {
        let records = vec![
            record("a", 0.81),
            record("b", 0.95),
            record("c", 0.40),
            record("d", 0.88),
            record("e", 0.80),
        ];

        let picks = top_picks(records, 0.80, 3);
        let labels: Vec<&str> = picks.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "d", "a"]);
    }

    #[test]
    fn test_top_picks_threshold_is_inclusive() {
        let picks = top_picks(vec![record("a", 0.80), record("b", 0.79)], 0.80, 3);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].label, "a");
    }

    #[test]
    fn test_match_winner_prices_by_outcome_label() {
        let offer = offer(
            "Bet365",
            "Match Winner",
            &[("Home", 1.1), ("Draw", 9.0), ("Away", 21.0)],
        );
        assert_eq!(match_winner_prices(&fixture(), &offer), Some([1.1, 9.0, 21.0]));
    }

    #[test]
    fn test_match_winner_prices_by_team_name() {
        let offer = offer(
            "Unibet",
            "1X2",
            &[("Arsenal", 1.2), ("Draw", 7.0), ("Luton", 15.0)],
        );
        assert_eq!(match_winner_prices(&fixture(), &offer), Some([1.2, 7.0, 15.0]));
    }

    #[test]
    fn test_match_winner_prices_requires_all_three() {
        let partial = offer("Bet365", "Match Winner", &[("Home", 1.1), ("Away", 21.0)]);
        assert_eq!(match_winner_prices(&fixture(), &partial), None);

        let other_market = offer(
            "Bet365",
            "Goals Over/Under",
            &[("Home", 1.1), ("Draw", 9.0), ("Away", 21.0)],
        );
        assert_eq!(match_winner_prices(&fixture(), &other_market), None);
    }

    #[test]
    fn test_find_top_match_winner_picks() {
        let offers = vec![
            offer(
                "Bet365",
                "Match Winner",
                &[("Home", 1.1), ("Draw", 9.0), ("Away", 21.0)],
            ),
            offer(
                "Unibet",
                "Match Winner",
                &[("Home", 1.15), ("Draw", 8.0), ("Away", 17.0)],
            ),
            offer("Pinnacle", "Both Teams Score", &[("Yes", 2.0), ("No", 1.8)]),
            // Invalid odds are skipped, not fatal
            offer(
                "Broken",
                "Match Winner",
                &[("Home", 0.0), ("Draw", 8.0), ("Away", 17.0)],
            ),
        ];

        let picks = find_top_match_winner_picks(&fixture(), &offers, &PickConfig::default());
        assert_eq!(picks.len(), 2);
        assert!(picks.iter().all(|p| p.label == "Arsenal"));
        assert_eq!(picks[0].bookmaker, "Bet365");
        assert_eq!(picks[1].bookmaker, "Unibet");
        assert!(picks[0].probability > picks[1].probability);
        assert!(picks[0].probability >= 0.80);
    }

    #[test]
    fn test_find_top_match_winner_picks_respects_config() {
        let offers = vec![offer(
            "Bet365",
            "Match Winner",
            &[("Home", 2.0), ("Draw", 3.0), ("Away", 4.0)],
        )];
        let config = PickConfig {
            min_probability: 0.0,
            top_n: 2,
        };

        let picks = find_top_match_winner_picks(&fixture(), &offers, &config);
        let labels: Vec<&str> = picks.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Arsenal", "Draw"]);

        let none = find_top_match_winner_picks(&fixture(), &offers, &PickConfig::default());
        assert!(none.is_empty());
    }

    #[test]
    fn test_match_winner_picks_follow_top_picks_rule() {
        // Identical prices from two bookmakers tie; the first offer stays first
        let offers = vec![
            offer(
                "Bet365",
                "Match Winner",
                &[("Home", 2.0), ("Draw", 3.0), ("Away", 4.0)],
            ),
            offer(
                "Unibet",
                "Match Winner",
                &[("Home", 2.0), ("Draw", 3.0), ("Away", 4.0)],
            ),
        ];
        let config = PickConfig {
            min_probability: 0.30,
            top_n: 3,
        };

        let picks = find_top_match_winner_picks(&fixture(), &offers, &config);
        let selected: Vec<(&str, &str)> = picks
            .iter()
            .map(|p| (p.label.as_str(), p.bookmaker.as_str()))
            .collect();
        assert_eq!(
            selected,
            vec![("Arsenal", "Bet365"), ("Arsenal", "Unibet"), ("Draw", "Bet365")]
        );

        // Same selection as running the bookmaker's records through top_picks
        let (h, d, a) = normalize_implied_probabilities(2.0, 3.0, 4.0).unwrap();
        let records = evaluate_match_result([h, d, a], [2.0, 3.0, 4.0]);
        let single = top_picks(records, config.min_probability, config.top_n);
        assert_eq!(single.len(), 2);
        assert_eq!(single[0].probability, picks[0].probability);
        assert_eq!(single[1].probability, picks[2].probability);
    }

    #[test]
    fn test_pick_format() {
        let pick = PickRecommendation {
            fixture_id: 1,
            home_team: "Arsenal".to_string(),
            away_team: "Luton".to_string(),
            bookmaker: "Bet365".to_string(),
            label: "Arsenal".to_string(),
            probability: 0.85,
            odds: 1.15,
            expected_value: -0.0225,
        };
        assert_eq!(pick.format(), "Arsenal: 85.0% | Odds=1.15 | EV=-0.02 (Bet365)");
    }
}
