use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{IncidentId, RiskLevel, UserId};

/// Stored SOS assessment: the reported situation and the score it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub incident_id: IncidentId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub hour: u8,
    pub crime_density: f64,
    pub poi_count: u32,
    pub night: bool,
    pub isolated: bool,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub recorded_at: DateTime<Utc>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait IncidentRepository: Send + Sync {
    fn insert(&self, record: IncidentRecord) -> Result<IncidentRecord, RepositoryError>;
    fn all(&self) -> Result<Vec<IncidentRecord>, RepositoryError>;
    fn for_user(&self, user_id: &UserId) -> Result<Vec<IncidentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// One row per reporting user, taken from their most recent incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub incident_count: usize,
    pub last_reported_at: DateTime<Utc>,
}

/// Collapses incidents to the latest entry per user, ordered by user id.
pub fn summarize_users(incidents: &[IncidentRecord]) -> Vec<UserSummary> {
    let mut users: BTreeMap<&UserId, UserSummary> = BTreeMap::new();

    for incident in incidents {
        users
            .entry(&incident.user_id)
            .and_modify(|summary| {
                summary.incident_count += 1;
                if incident.recorded_at >= summary.last_reported_at {
                    summary.username = incident.username.clone();
                    summary.latitude = incident.latitude;
                    summary.longitude = incident.longitude;
                    summary.risk_score = incident.risk_score;
                    summary.risk_level = incident.risk_level;
                    summary.last_reported_at = incident.recorded_at;
                }
            })
            .or_insert_with(|| UserSummary {
                user_id: incident.user_id.clone(),
                username: incident.username.clone(),
                latitude: incident.latitude,
                longitude: incident.longitude,
                risk_score: incident.risk_score,
                risk_level: incident.risk_level,
                incident_count: 1,
                last_reported_at: incident.recorded_at,
            });
    }

    users.into_values().collect()
}
