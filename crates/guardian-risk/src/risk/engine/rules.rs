use super::super::domain::{FeatureRecord, RiskLevel, RiskResult};
use super::DecisionBasis;

pub(crate) const CRITICAL_DENSITY: f64 = 0.8;
pub(crate) const COMPOUND_DENSITY: f64 = 0.6;
pub(crate) const MODERATE_DENSITY: f64 = 0.3;

/// Deterministic rule that preempts the model when its predicate holds.
pub(crate) struct OverrideRule {
    pub basis: DecisionBasis,
    pub applies: fn(&FeatureRecord) -> bool,
    pub outcome: RiskResult,
}

/// Evaluated top to bottom; the first matching rule wins.
pub(crate) static OVERRIDE_RULES: [OverrideRule; 3] = [
    OverrideRule {
        basis: DecisionBasis::CriticalDensity,
        applies: critical_density,
        outcome: RiskResult::new(95, RiskLevel::High),
    },
    OverrideRule {
        basis: DecisionBasis::IsolatedAtNight,
        applies: isolated_at_night,
        outcome: RiskResult::new(90, RiskLevel::High),
    },
    OverrideRule {
        basis: DecisionBasis::ModerateDensity,
        applies: moderate_density,
        outcome: RiskResult::new(55, RiskLevel::Medium),
    },
];

fn critical_density(features: &FeatureRecord) -> bool {
    features.crime_density >= CRITICAL_DENSITY
}

fn isolated_at_night(features: &FeatureRecord) -> bool {
    features.crime_density >= COMPOUND_DENSITY && features.is_night && features.is_isolated
}

fn moderate_density(features: &FeatureRecord) -> bool {
    features.crime_density >= MODERATE_DENSITY
}

pub(crate) fn first_match(features: &FeatureRecord) -> Option<&'static OverrideRule> {
    OVERRIDE_RULES.iter().find(|rule| (rule.applies)(features))
}
