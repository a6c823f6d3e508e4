use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{IncidentId, ModelInput, SituationReport, UserId};
use super::engine::{Decision, InvalidInput, RiskDecisionEngine};
use super::features::SituationPolicy;
use super::model::{ClassProbabilities, ModelError, RiskModel};
use super::repository::{
    summarize_users, IncidentRecord, IncidentRepository, RepositoryError, UserSummary,
};

/// Service composing feature derivation, model inference, the decision engine,
/// and the incident log.
pub struct RiskAssessmentService<R, M> {
    policy: SituationPolicy,
    engine: RiskDecisionEngine,
    model: Arc<M>,
    repository: Arc<R>,
}

static INCIDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_incident_id() -> IncidentId {
    let id = INCIDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    IncidentId(format!("inc-{id:06}"))
}

impl<R, M> RiskAssessmentService<R, M>
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    pub fn new(repository: Arc<R>, model: Arc<M>, policy: SituationPolicy) -> Self {
        Self {
            policy,
            engine: RiskDecisionEngine::new(),
            model,
            repository,
        }
    }

    /// Score a situation without recording it.
    pub fn predict(&self, report: &SituationReport) -> Result<Decision, RiskServiceError> {
        let input = self.normalize(report)?;
        self.score(&input)
    }

    fn normalize(&self, report: &SituationReport) -> Result<ModelInput, InvalidInput> {
        self.policy.normalize(report).map_err(|err| {
            warn!(field = err.field, detail = %err.detail, "rejected situation report");
            err
        })
    }

    fn score(&self, input: &ModelInput) -> Result<Decision, RiskServiceError> {
        let prediction = self.model.predict(input)?;
        let probabilities = ClassProbabilities::from_prediction(&prediction)?;
        let decision = self.engine.explain(&input.features(), probabilities.high())?;

        debug!(
            crime_density = input.crime_density,
            is_night = input.is_night,
            is_isolated = input.is_isolated,
            high_prob = probabilities.high(),
            basis = ?decision.basis,
            score = decision.result.score(),
            level = %decision.result.level(),
            "situation scored"
        );

        Ok(decision)
    }

    /// Score a situation on behalf of a user and append it to the incident log.
    pub fn report_sos(
        &self,
        report: &SituationReport,
    ) -> Result<IncidentRecord, RiskServiceError> {
        let user_id = report
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| InvalidInput::new("userId", "an SOS report must name its user"))?;

        let input = self.normalize(report)?;
        let decision = self.score(&input)?;

        let record = IncidentRecord {
            incident_id: next_incident_id(),
            user_id: UserId(user_id.to_string()),
            username: report.username.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            hour: input.hour,
            crime_density: input.crime_density,
            poi_count: input.poi_count,
            night: input.is_night,
            isolated: input.is_isolated,
            risk_score: decision.result.score(),
            risk_level: decision.result.level(),
            recorded_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            incident_id = %stored.incident_id.0,
            user_id = %stored.user_id.0,
            score = stored.risk_score,
            level = %stored.risk_level,
            "sos incident recorded"
        );
        Ok(stored)
    }

    pub fn incidents(&self) -> Result<Vec<IncidentRecord>, RiskServiceError> {
        Ok(self.repository.all()?)
    }

    pub fn incidents_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<IncidentRecord>, RiskServiceError> {
        Ok(self.repository.for_user(user_id)?)
    }

    pub fn users(&self) -> Result<Vec<UserSummary>, RiskServiceError> {
        let incidents = self.repository.all()?;
        Ok(summarize_users(&incidents))
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum RiskServiceError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
