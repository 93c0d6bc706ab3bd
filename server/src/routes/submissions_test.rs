use axum::body::to_bytes;
use solvency::model::SubmissionStatus;
use time::macros::datetime;

use super::*;
use crate::state::test_helpers::{seed_entry, test_app_state};

async fn json_of(resp: Response) -> (StatusCode, serde_json::Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// list_submissions
// =============================================================================

#[tokio::test]
async fn empty_ledger_lists_nothing() {
    let Json(env) = list_submissions(State(test_app_state())).await;
    assert!(env.success);
    assert!(env.data.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
    let state = test_app_state();
    seed_entry(&state, "old", 120.0, datetime!(2025-01-01 0:00 UTC)).await;
    seed_entry(&state, "new", 80.0, datetime!(2025-02-01 0:00 UTC)).await;

    let Json(env) = list_submissions(State(state)).await;
    let ids: Vec<String> = env.data.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, ["new", "old"]);
}

// =============================================================================
// create_submission
// =============================================================================

#[tokio::test]
async fn create_records_compliant_submission() {
    let state = test_app_state();
    let payload = NewSubmission::new(1_500_000.0, 1_000_000.0, "2025-03-31");

    let (status, body) = json_of(create_submission(State(state.clone()), Ok(Json(payload))).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "Compliant");
    assert_eq!(body["data"]["solvencyRatio"], 150.0);
    assert_eq!(body["data"]["transactionHash"].as_str().unwrap().len(), 64);
    assert_eq!(state.ledger.read().await.len(), 1);
}

#[tokio::test]
async fn create_below_threshold_is_non_compliant() {
    let state = test_app_state();
    let payload = NewSubmission::new(900.0, 1_000.0, "2025-03-31");

    let (_, body) = json_of(create_submission(State(state), Ok(Json(payload))).await).await;
    assert_eq!(body["data"]["status"], "Non-Compliant");
}

#[tokio::test]
async fn create_keeps_insurer_on_ledger() {
    let state = test_app_state();
    let mut payload = NewSubmission::new(1.0, 1.0, "2025-03-31");
    payload.insurer_id = Some("1".into());

    let _ = create_submission(State(state.clone()), Ok(Json(payload))).await;
    assert_eq!(state.ledger.read().await[0].insurer_id.as_deref(), Some("1"));
}

#[tokio::test]
async fn invalid_payload_is_400_failure_envelope() {
    let state = test_app_state();
    let payload = NewSubmission::new(1.0, 0.0, "2025-03-31");

    let (status, body) = json_of(create_submission(State(state.clone()), Ok(Json(payload))).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "liabilities must be greater than zero");
    assert!(state.ledger.read().await.is_empty());
}

#[test]
fn validation_errors_are_bad_requests() {
    assert_eq!(submission_error_to_status(&SubmissionError::NegativeCapital), StatusCode::BAD_REQUEST);
    assert_eq!(
        submission_error_to_status(&SubmissionError::InvalidDate("x".into())),
        StatusCode::BAD_REQUEST
    );
}

// =============================================================================
// compliance_status
// =============================================================================

#[tokio::test]
async fn compliance_status_without_submissions_is_404() {
    let (status, body) = json_of(compliance_status(State(test_app_state())).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "no submissions recorded");
}

#[tokio::test]
async fn compliance_status_reflects_latest_entry() {
    let state = test_app_state();
    seed_entry(&state, "a", 150.0, datetime!(2025-01-01 0:00 UTC)).await;
    seed_entry(&state, "b", 90.0, datetime!(2025-02-01 12:30 UTC)).await;

    let (status, body) = json_of(compliance_status(State(state)).await).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: ComplianceStatus = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(snapshot.status, SubmissionStatus::NonCompliant);
    assert!((snapshot.solvency_ratio - 90.0).abs() < f64::EPSILON);
    assert_eq!(snapshot.last_check, datetime!(2025-02-01 12:30 UTC));
}

#[tokio::test]
async fn overflowing_ratio_is_rejected_and_ledger_stays_readable() {
    let state = test_app_state();
    let payload = NewSubmission::new(1e308, 1e-10, "2025-03-31");

    let (status, body) = json_of(create_submission(State(state.clone()), Ok(Json(payload))).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "solvencyRatio must be a finite number");
    assert!(state.ledger.read().await.is_empty());

    let _ = create_submission(State(state.clone()), Ok(Json(NewSubmission::new(2.0, 1.0, "2025-03-31")))).await;
    let Json(env) = list_submissions(State(state)).await;
    let listed = env.data.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].solvency_ratio.is_finite());
}

// =============================================================================
// submission_history
// =============================================================================

#[tokio::test]
async fn history_only_returns_the_insurers_entries() {
    let state = test_app_state();
    for (id, insurer, day) in [("a", "1", 1), ("b", "2", 2), ("c", "1", 3), ("d", "1", 4)] {
        let at = datetime!(2025-01-01 0:00 UTC) + time::Duration::days(day);
        crate::state::test_helpers::seed_entry_for(&state, id, Some(insurer), 120.0, at).await;
    }

    let Json(env) = submission_history(
        State(state.clone()),
        Path("1".to_owned()),
        Query(HistoryQuery { limit: Some(2) }),
    )
    .await;
    let ids: Vec<String> = env.data.unwrap().into_iter().map(|r| r.submission.id).collect();
    assert_eq!(ids, ["d", "c"]);

    let Json(env) = submission_history(State(state), Path("2".to_owned()), Query(HistoryQuery::default())).await;
    assert_eq!(env.data.unwrap().len(), 1);
}

// =============================================================================
// verify_submission
// =============================================================================

#[tokio::test]
async fn verify_reports_intact_submission() {
    let state = test_app_state();
    let mut payload = NewSubmission::new(1_500.0, 1_000.0, "2025-03-31");
    payload.insurer_id = Some("1".into());
    let (_, body) = json_of(create_submission(State(state.clone()), Ok(Json(payload))).await).await;
    let id = body["data"]["id"].as_str().unwrap().to_owned();

    let (status, body) = json_of(verify_submission(State(state.clone()), Path(id.clone())).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["intact"], true);
    assert_eq!(body["data"]["storedHash"], body["data"]["recomputedHash"]);

    state.ledger.write().await[0].submission.liabilities = 1.0;
    let (_, body) = json_of(verify_submission(State(state), Path(id)).await).await;
    assert_eq!(body["data"]["intact"], false);
}

#[tokio::test]
async fn verify_unknown_submission_is_404() {
    let (status, body) = json_of(verify_submission(State(test_app_state()), Path("nope".to_owned())).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
