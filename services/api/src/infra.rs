use guardian_risk::config::RiskSettings;
use guardian_risk::risk::{
    IncidentRecord, IncidentRepository, ModelError, OrdinalLogisticModel, RepositoryError,
    RiskAssessmentService, SituationPolicy, UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryIncidentRepository {
    records: Arc<Mutex<Vec<IncidentRecord>>>,
}

impl IncidentRepository for InMemoryIncidentRepository {
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
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

pub(crate) type AssessmentService =
    RiskAssessmentService<InMemoryIncidentRepository, OrdinalLogisticModel>;

/// Loads the model once; the handle is shared read-only for the process lifetime.
pub(crate) fn load_model(settings: &RiskSettings) -> Result<OrdinalLogisticModel, ModelError> {
    match &settings.model_path {
        Some(path) => {
            let model = OrdinalLogisticModel::from_path(path)?;
            info!(path = %path.display(), "loaded model weights");
            Ok(model)
        }
        None => {
            info!("using built-in model weights");
            Ok(OrdinalLogisticModel::default())
        }
    }
}

pub(crate) fn build_assessment_service(
    settings: &RiskSettings,
) -> Result<AssessmentService, ModelError> {
    let model = Arc::new(load_model(settings)?);
    let repository = Arc::new(InMemoryIncidentRepository::default());
    Ok(RiskAssessmentService::new(
        repository,
        model,
        SituationPolicy::from_settings(settings),
    ))
}
