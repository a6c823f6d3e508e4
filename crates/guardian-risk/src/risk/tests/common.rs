use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::risk::domain::{FeatureRecord, ModelInput, SituationReport, UserId};
use crate::risk::features::SituationPolicy;
use crate::risk::model::{ModelError, RawPrediction, RiskModel};
use crate::risk::repository::{IncidentRecord, IncidentRepository, RepositoryError};
use crate::risk::{risk_router, RiskAssessmentService};

pub(super) fn features(crime_density: f64, is_night: bool, is_isolated: bool) -> FeatureRecord {
    FeatureRecord {
        crime_density,
        is_night,
        is_isolated,
    }
}

pub(super) fn report(crime_density: f64, hour: u8, poi_count: u32) -> SituationReport {
    SituationReport {
        user_id: Some("user-42".to_string()),
        username: Some("Asha".to_string()),
        latitude: 12.9716,
        longitude: 77.5946,
        hour,
        crime_density,
        poi_count,
        is_night: None,
        is_isolated: None,
    }
}

pub(super) fn flagged_report(
    crime_density: f64,
    is_night: bool,
    is_isolated: bool,
) -> SituationReport {
    SituationReport {
        is_night: Some(is_night),
        is_isolated: Some(is_isolated),
        ..report(crime_density, 14, 20)
    }
}

/// Model stub that always reports the configured HIGH probability.
pub(super) struct FixedModel {
    pub(super) high: f64,
    pub(super) calls: Mutex<Vec<ModelInput>>,
}

impl FixedModel {
    pub(super) fn new(high: f64) -> Self {
        Self {
            high,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<ModelInput> {
        self.calls.lock().expect("model mutex poisoned").clone()
    }
}

impl RiskModel for FixedModel {
    fn predict(&self, input: &ModelInput) -> Result<RawPrediction, ModelError> {
        self.calls
            .lock()
            .expect("model mutex poisoned")
            .push(*input);
        let remainder = 1.0 - self.high;
        Ok(RawPrediction {
            classes: vec![2, 0, 1],
            probabilities: vec![self.high, remainder / 2.0, remainder / 2.0],
        })
    }
}

/// Model stub that reports a label set the engine cannot map.
pub(super) struct MislabeledModel;

impl RiskModel for MislabeledModel {
    fn predict(&self, _input: &ModelInput) -> Result<RawPrediction, ModelError> {
        Ok(RawPrediction {
            classes: vec![0, 1, 3],
            probabilities: vec![0.2, 0.3, 0.5],
        })
    }
}

pub(super) struct OfflineModel;

impl RiskModel for OfflineModel {
    fn predict(&self, _input: &ModelInput) -> Result<RawPrediction, ModelError> {
        Err(ModelError::Inference("model backend offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<IncidentRecord>>>,
}

impl MemoryRepository {
    pub(super) fn all_records(&self) -> Vec<IncidentRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl IncidentRepository for MemoryRepository {
    fn insert(&self, record: IncidentRecord) -> Result<IncidentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.incident_id == record.incident_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn all(&self) -> Result<Vec<IncidentRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn for_user(&self, user_id: &UserId) -> Result<Vec<IncidentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl IncidentRepository for UnavailableRepository {
    fn insert(&self, _record: IncidentRecord) -> Result<IncidentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<IncidentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_user(&self, _user_id: &UserId) -> Result<Vec<IncidentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    high: f64,
) -> (
    RiskAssessmentService<MemoryRepository, FixedModel>,
    Arc<MemoryRepository>,
    Arc<FixedModel>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let model = Arc::new(FixedModel::new(high));
    let service =
        RiskAssessmentService::new(repository.clone(), model.clone(), SituationPolicy::default());
    (service, repository, model)
}

pub(super) fn risk_router_with_service(
    service: RiskAssessmentService<MemoryRepository, FixedModel>,
) -> axum::Router {
    risk_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
