use super::common::*;
use crate::risk::domain::{RiskLevel, UserId};
use crate::risk::engine::DecisionBasis;
use crate::risk::features::SituationPolicy;
use crate::risk::repository::RepositoryError;
use crate::risk::{RiskAssessmentService, RiskServiceError};
use std::sync::Arc;

#[test]
fn predict_uses_model_probability_in_low_density_regime() {
    let (service, repository, model) = build_service(0.8);

    let decision = service
        .predict(&flagged_report(0.1, false, false))
        .expect("prediction succeeds");

    assert_eq!(decision.basis, DecisionBasis::Model);
    assert_eq!(decision.result.score(), 80);
    assert_eq!(decision.result.level(), RiskLevel::High);
    assert_eq!(model.calls().len(), 1);
    assert!(
        repository.all_records().is_empty(),
        "prediction should not record incidents"
    );
}

#[test]
fn predict_lets_overrides_preempt_the_model() {
    let (service, _, _) = build_service(0.05);

    let decision = service
        .predict(&flagged_report(0.65, true, true))
        .expect("prediction succeeds");

    assert_eq!(decision.basis, DecisionBasis::IsolatedAtNight);
    assert_eq!(decision.result.score(), 90);
    assert_eq!(decision.result.level(), RiskLevel::High);
}

#[test]
fn predict_passes_derived_flags_to_the_model() {
    let (service, _, model) = build_service(0.1);

    let decision = service
        .predict(&report(0.65, 23, 2))
        .expect("prediction succeeds");

    assert_eq!(decision.basis, DecisionBasis::IsolatedAtNight);
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_night);
    assert!(calls[0].is_isolated);
}

#[test]
fn predict_rejects_invalid_reports_before_inference() {
    let (service, _, model) = build_service(0.5);

    match service.predict(&report(1.4, 10, 10)) {
        Err(RiskServiceError::InvalidInput(err)) => assert_eq!(err.field, "crime_density"),
        other => panic!("expected invalid input, got {other:?}"),
    }
    assert!(model.calls().is_empty());
}

#[test]
fn predict_rejects_unmappable_model_output() {
    let service = RiskAssessmentService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(MislabeledModel),
        SituationPolicy::default(),
    );

    match service.predict(&report(0.1, 10, 10)) {
        Err(RiskServiceError::InvalidInput(err)) => assert_eq!(err.field, "classes"),
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn predict_propagates_model_failures() {
    let service = RiskAssessmentService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(OfflineModel),
        SituationPolicy::default(),
    );

    assert!(matches!(
        service.predict(&report(0.1, 10, 10)),
        Err(RiskServiceError::Model(_))
    ));
}

#[test]
fn report_sos_records_the_incident() {
    let (service, repository, _) = build_service(0.5);

    let record = service
        .report_sos(&flagged_report(0.1, false, false))
        .expect("sos recorded");

    assert!(record.incident_id.0.starts_with("inc-"));
    assert_eq!(record.user_id, UserId("user-42".to_string()));
    assert_eq!(record.risk_score, 50);
    assert_eq!(record.risk_level, RiskLevel::Medium);

    let stored = repository.all_records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], record);
}

#[test]
fn report_sos_requires_a_user() {
    let (service, repository, model) = build_service(0.5);
    let mut situation = report(0.1, 10, 10);
    situation.user_id = Some("   ".to_string());

    match service.report_sos(&situation) {
        Err(RiskServiceError::InvalidInput(err)) => assert_eq!(err.field, "userId"),
        other => panic!("expected invalid input, got {other:?}"),
    }
    assert!(repository.all_records().is_empty());
    assert!(model.calls().is_empty());
}

#[test]
fn report_sos_propagates_repository_errors() {
    let service = RiskAssessmentService::new(
        Arc::new(UnavailableRepository),
        Arc::new(FixedModel::new(0.5)),
        SituationPolicy::default(),
    );

    match service.report_sos(&report(0.1, 10, 10)) {
        Err(RiskServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }
}

#[test]
fn users_collapses_incidents_per_user() {
    let (service, _, _) = build_service(0.2);

    service
        .report_sos(&report(0.1, 10, 10))
        .expect("first sos");
    let latest = service
        .report_sos(&report(0.9, 11, 10))
        .expect("second sos");
    let mut other = report(0.1, 12, 10);
    other.user_id = Some("user-7".to_string());
    service.report_sos(&other).expect("other user sos");

    let users = service.users().expect("users listed");
    assert_eq!(users.len(), 2);
    let summary = users
        .iter()
        .find(|summary| summary.user_id == UserId("user-42".to_string()))
        .expect("user-42 summarized");
    assert_eq!(summary.incident_count, 2);
    assert_eq!(summary.risk_score, latest.risk_score);

    let incidents = service
        .incidents_for(&UserId("user-7".to_string()))
        .expect("incidents listed");
    assert_eq!(incidents.len(), 1);
    assert_eq!(service.incidents().expect("all incidents").len(), 3);
}
