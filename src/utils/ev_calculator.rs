use crate::models::{Estimate, Outcome, OutcomeRecord};
use thiserror::Error;

/// Average goals per team above which a matchup is treated as goal-prone
pub const GOAL_RATE_THRESHOLD: f64 = 1.8;

/// Added to the over 2.5 probability for goal-prone matchups
pub const HIGH_SCORING_BOOST: f64 = 0.05;

/// Subtracted when key attacking players are unavailable
pub const MISSING_PLAYERS_PENALTY: f64 = 0.07;

/// Subtracted from BTTS when a strong defense is present
pub const STRONG_DEFENSE_PENALTY: f64 = 0.05;

/// Added to BTTS when no strong defense is present
pub const WEAK_DEFENSE_BOOST: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EstimateError {
    #[error("invalid odds {0}: decimal odds must be finite and greater than zero")]
    InvalidOdds(f64),
    #[error("invalid percentage {0}: expected a value between 0 and 100")]
    InvalidPercentage(f64),
}

fn check_odds(odds: f64) -> Result<f64, EstimateError> {
    // Subnormal odds overflow the reciprocal; NaN fails the comparison
    if odds.is_finite() && odds > 0.0 && (1.0 / odds).is_finite() {
        Ok(odds)
    } else {
        Err(EstimateError::InvalidOdds(odds))
    }
}

fn check_percentage(percentage: f64) -> Result<f64, EstimateError> {
    if (0.0..=100.0).contains(&percentage) {
        Ok(percentage)
    } else {
        Err(EstimateError::InvalidPercentage(percentage))
    }
}

/// Calculate expected value per unit staked at decimal odds
/// EV = probability * odds - 1
pub fn expected_value(probability: f64, odds: f64) -> f64 {
    probability * odds - 1.0
}

/// Convert three mutually exclusive decimal odds into implied probabilities
/// with the bookmaker margin removed.
///
/// Each raw probability is `1 / odds`; the raw values are divided by their sum
/// so the returned triple always adds up to 1.
pub fn normalize_implied_probabilities(
    home_odds: f64,
    draw_odds: f64,
    away_odds: f64,
) -> Result<(f64, f64, f64), EstimateError> {
    let home = 1.0 / check_odds(home_odds)?;
    let draw = 1.0 / check_odds(draw_odds)?;
    let away = 1.0 / check_odds(away_odds)?;

    // Overround: sum > 1 when the bookmaker takes a margin
    let total = home + draw + away;
    if !total.is_finite() {
        return Err(EstimateError::InvalidOdds(home_odds.min(draw_odds).min(away_odds)));
    }

    Ok((home / total, draw / total, away / total))
}

/// Estimate the probability of over 2.5 goals and its EV.
///
/// `percentage` is the base scoring rate (0-100) for the market, `goals_home`
/// and `goals_away` are each team's average goals per match.
pub fn estimate_over_under(
    percentage: f64,
    goals_home: f64,
    goals_away: f64,
    odds: f64,
    players_missing: bool,
) -> Result<Estimate, EstimateError> {
    let mut probability = check_percentage(percentage)? / 100.0;
    let odds = check_odds(odds)?;

    if (goals_home + goals_away) / 2.0 > GOAL_RATE_THRESHOLD {
        probability += HIGH_SCORING_BOOST;
    }
    if players_missing {
        probability -= MISSING_PLAYERS_PENALTY;
    }
    let probability = probability.clamp(0.0, 1.0);

    Ok(Estimate {
        probability,
        expected_value: expected_value(probability, odds),
    })
}

/// Estimate the probability that both teams score and its EV.
///
/// Exactly one defensive adjustment applies: a strong defense lowers the
/// probability, otherwise it is raised slightly.
pub fn estimate_btts(
    home_percentage: f64,
    away_percentage: f64,
    odds: f64,
    attacker_missing: bool,
    strong_defense: bool,
) -> Result<Estimate, EstimateError> {
    let home = check_percentage(home_percentage)?;
    let away = check_percentage(away_percentage)?;
    let odds = check_odds(odds)?;

    let mut probability = (home + away) / 2.0 / 100.0;
    if attacker_missing {
        probability -= MISSING_PLAYERS_PENALTY;
    }
    if strong_defense {
        probability -= STRONG_DEFENSE_PENALTY;
    } else {
        probability += WEAK_DEFENSE_BOOST;
    }
    let probability = probability.clamp(0.0, 1.0);

    Ok(Estimate {
        probability,
        expected_value: expected_value(probability, odds),
    })
}

/// Pair caller-estimated 1X2 probabilities with their odds.
/// Records are returned in Home, Draw, Away order.
pub fn evaluate_match_result(probabilities: [f64; 3], odds: [f64; 3]) -> Vec<OutcomeRecord> {
    Outcome::ALL
        .iter()
        .zip(probabilities.iter().zip(odds.iter()))
        .map(|(outcome, (&probability, &odds))| OutcomeRecord {
            label: outcome.label().to_string(),
            probability,
            odds,
            expected_value: expected_value(probability, odds),
        })
        .collect()
}
