use super::super::domain::{RiskLevel, RiskResult};

pub(crate) const HIGH_SCORE_FLOOR: u8 = 75;
pub(crate) const MEDIUM_SCORE_FLOOR: u8 = 45;

/// Converts the HIGH-class probability to a score by truncation, not rounding.
pub(crate) fn score_from_probability(high_prob: f64) -> u8 {
    (high_prob * 100.0).floor().clamp(0.0, 100.0) as u8
}

pub(crate) fn level_for_score(score: u8) -> RiskLevel {
    if score >= HIGH_SCORE_FLOOR {
        RiskLevel::High
    } else if score >= MEDIUM_SCORE_FLOOR {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub(crate) fn model_driven(high_prob: f64) -> RiskResult {
    let score = score_from_probability(high_prob);
    RiskResult::new(score, level_for_score(score))
}
