mod policy;
mod rules;

use super::domain::{FeatureRecord, RiskResult};
use serde::Serialize;

/// Input outside its documented domain. The engine never clamps or repairs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input for {field}: {detail}")]
pub struct InvalidInput {
    pub field: &'static str,
    pub detail: String,
}

impl InvalidInput {
    pub fn new(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }

    /// Rejects non-finite values and anything outside `[0, 1]`.
    pub(crate) fn check_unit_interval(field: &'static str, value: f64) -> Result<f64, Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(Self::new(
                field,
                format!("{value} is not a finite value in [0, 1]"),
            ))
        }
    }
}

/// Which step of the ordered procedure produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    CriticalDensity,
    IsolatedAtNight,
    ModerateDensity,
    Model,
}

impl DecisionBasis {
    pub fn is_override(&self) -> bool {
        !matches!(self, DecisionBasis::Model)
    }
}

/// Result paired with the rule that produced it, for audit trails and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    #[serde(flatten)]
    pub result: RiskResult,
    pub basis: DecisionBasis,
}

/// Stateless evaluator combining hard overrides with the model estimate.
///
/// Overrides are checked strictly before the model; the HIGH-class
/// probability only matters when crime density is below the moderate band.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskDecisionEngine;

impl RiskDecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(
        &self,
        features: &FeatureRecord,
        high_prob: f64,
    ) -> Result<RiskResult, InvalidInput> {
        self.explain(features, high_prob)
            .map(|decision| decision.result)
    }

    pub fn explain(
        &self,
        features: &FeatureRecord,
        high_prob: f64,
    ) -> Result<Decision, InvalidInput> {
        InvalidInput::check_unit_interval("crime_density", features.crime_density)?;
        InvalidInput::check_unit_interval("high_prob", high_prob)?;

        if let Some(rule) = rules::first_match(features) {
            return Ok(Decision {
                result: rule.outcome,
                basis: rule.basis,
            });
        }

        Ok(Decision {
            result: policy::model_driven(high_prob),
            basis: DecisionBasis::Model,
        })
    }
}
