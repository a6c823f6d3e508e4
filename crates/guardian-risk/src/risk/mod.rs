//! Situation risk scoring: boundary validation, model inference, the ordered
//! decision engine, and the SOS incident log.

pub mod domain;
pub mod engine;
pub mod features;
pub mod model;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    FeatureRecord, IncidentId, ModelInput, RiskClass, RiskLevel, RiskResult, SituationReport,
    UserId,
};
pub use engine::{Decision, DecisionBasis, InvalidInput, RiskDecisionEngine};
pub use features::SituationPolicy;
pub use model::{
    ClassProbabilities, ClassWeights, ModelError, ModelWeights, OrdinalLogisticModel,
    RawPrediction, RiskModel,
};
pub use repository::{
    summarize_users, IncidentRecord, IncidentRepository, RepositoryError, UserSummary,
};
pub use router::{risk_router, SosReceipt};
pub use service::{RiskAssessmentService, RiskServiceError};
