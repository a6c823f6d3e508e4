use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{IncidentId, RiskLevel, SituationReport, UserId};
use super::model::RiskModel;
use super::repository::IncidentRepository;
use super::service::{RiskAssessmentService, RiskServiceError};

/// Router builder exposing scoring, SOS intake, and incident lookups.
pub fn risk_router<R, M>(service: Arc<RiskAssessmentService<R, M>>) -> Router
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    Router::new()
        .route("/api/v1/risk/predict", post(predict_handler::<R, M>))
        .route(
            "/api/v1/sos",
            post(sos_handler::<R, M>).get(incidents_handler::<R, M>),
        )
        .route("/api/v1/users", get(users_handler::<R, M>))
        .route(
            "/api/v1/users/:user_id/incidents",
            get(user_incidents_handler::<R, M>),
        )
        .with_state(service)
}

/// Response body for a recorded SOS.
#[derive(Debug, Clone, Serialize)]
pub struct SosReceipt {
    pub incident_id: IncidentId,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

pub(crate) async fn predict_handler<R, M>(
    State(service): State<Arc<RiskAssessmentService<R, M>>>,
    axum::Json(report): axum::Json<SituationReport>,
) -> Response
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    match service.predict(&report) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision.result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sos_handler<R, M>(
    State(service): State<Arc<RiskAssessmentService<R, M>>>,
    axum::Json(report): axum::Json<SituationReport>,
) -> Response
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    match service.report_sos(&report) {
        Ok(record) => {
            let receipt = SosReceipt {
                incident_id: record.incident_id,
                risk_score: record.risk_score,
                risk_level: record.risk_level,
            };
            (StatusCode::OK, axum::Json(receipt)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn incidents_handler<R, M>(
    State(service): State<Arc<RiskAssessmentService<R, M>>>,
) -> Response
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    match service.incidents() {
        Ok(incidents) => (StatusCode::OK, axum::Json(incidents)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn users_handler<R, M>(
    State(service): State<Arc<RiskAssessmentService<R, M>>>,
) -> Response
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    match service.users() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn user_incidents_handler<R, M>(
    State(service): State<Arc<RiskAssessmentService<R, M>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: IncidentRepository + 'static,
    M: RiskModel + 'static,
{
    match service.incidents_for(&UserId(user_id)) {
        Ok(incidents) => (StatusCode::OK, axum::Json(incidents)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RiskServiceError) -> Response {
    let status = match &err {
        RiskServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RiskServiceError::Model(_) => StatusCode::BAD_GATEWAY,
        RiskServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
