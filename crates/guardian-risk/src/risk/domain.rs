use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for recorded incidents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IncidentId(pub String);

/// Identifier wrapper for the reporting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Three-way risk level surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal classes produced by the statistical model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

impl RiskClass {
    pub const ALL: [RiskClass; 3] = [RiskClass::Low, RiskClass::Medium, RiskClass::High];

    /// Numeric label the classifier was trained with.
    pub fn ordinal(&self) -> u8 {
        match self {
            RiskClass::Low => 0,
            RiskClass::Medium => 1,
            RiskClass::High => 2,
        }
    }

    pub fn from_ordinal(label: i64) -> Option<Self> {
        match label {
            0 => Some(RiskClass::Low),
            1 => Some(RiskClass::Medium),
            2 => Some(RiskClass::High),
            _ => None,
        }
    }
}

/// Normalized contextual signals consumed by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub crime_density: f64,
    pub is_night: bool,
    pub is_isolated: bool,
}

/// Final score and level. Only the decision engine builds these, so the level
/// always agrees with the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RiskResult {
    #[serde(rename = "risk_score")]
    score: u8,
    #[serde(rename = "risk_level")]
    level: RiskLevel,
}

impl RiskResult {
    pub(crate) const fn new(score: u8, level: RiskLevel) -> Self {
        Self { score, level }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn level(&self) -> RiskLevel {
        self.level
    }
}

/// Raw situation as submitted by a client device.
///
/// Field names follow the mobile client payload. The night and isolation
/// flags are optional; when absent they are derived from `hour` and
/// `poi_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationReport {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub hour: u8,
    pub crime_density: f64,
    pub poi_count: u32,
    #[serde(rename = "isNight", default, skip_serializing_if = "Option::is_none")]
    pub is_night: Option<bool>,
    #[serde(rename = "isIsolated", default, skip_serializing_if = "Option::is_none")]
    pub is_isolated: Option<bool>,
}

/// Full feature vector handed to the statistical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    pub latitude: f64,
    pub longitude: f64,
    pub hour: u8,
    pub crime_density: f64,
    pub poi_count: u32,
    pub is_night: bool,
    pub is_isolated: bool,
}

impl ModelInput {
    pub fn features(&self) -> FeatureRecord {
        FeatureRecord {
            crime_density: self.crime_density,
            is_night: self.is_night,
            is_isolated: self.is_isolated,
        }
    }

    /// Column order matches the training frame.
    pub fn as_vector(&self) -> [f64; 7] {
        [
            self.latitude,
            self.longitude,
            f64::from(self.hour),
            self.crime_density,
            f64::from(self.poi_count),
            if self.is_night { 1.0 } else { 0.0 },
            if self.is_isolated { 1.0 } else { 0.0 },
        ]
    }
}
