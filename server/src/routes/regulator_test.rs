use axum::body::to_bytes;
use time::macros::datetime;

use super::*;
use crate::state::test_helpers::{seed_entry, seed_entry_for, test_app_state};

async fn json_of(resp: Response) -> (StatusCode, serde_json::Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn request(id: &str, comments: Option<&str>) -> Result<Json<ReviewRequest>, JsonRejection> {
    let mut body = ReviewRequest::new(id);
    body.regulator_id = Some("reg-1".into());
    body.comments = comments.map(str::to_owned);
    Ok(Json(body))
}

// =============================================================================
// pending
// =============================================================================

#[tokio::test]
async fn pending_lists_unreviewed_newest_first() {
    let state = test_app_state();
    seed_entry(&state, "a", 150.0, datetime!(2025-01-01 0:00 UTC)).await;
    seed_entry(&state, "b", 90.0, datetime!(2025-02-01 0:00 UTC)).await;

    let Json(env) = pending_submissions(State(state)).await;
    let records = env.data.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.submission.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert!(records.iter().all(|r| r.review_state == solvency::model::ReviewState::Pending));
}

// =============================================================================
// approve / reject
// =============================================================================

#[tokio::test]
async fn approve_moves_submission_out_of_pending() {
    let state = test_app_state();
    seed_entry_for(&state, "a", Some("1"), 150.0, datetime!(2025-01-01 0:00 UTC)).await;

    let (status, body) = json_of(approve_submission(State(state.clone()), request("a", Some("ok"))).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["reviewState"], "REGULATOR_APPROVED");
    assert_eq!(body["data"]["review"]["regulatorId"], "reg-1");
    assert_eq!(body["data"]["review"]["comments"], "ok");
    assert_eq!(body["data"]["review"]["approvalHash"].as_str().unwrap().len(), 64);

    let Json(env) = pending_submissions(State(state)).await;
    assert!(env.data.unwrap().is_empty());
}

#[tokio::test]
async fn reject_then_approve_is_refused() {
    let state = test_app_state();
    seed_entry(&state, "a", 90.0, datetime!(2025-01-01 0:00 UTC)).await;

    let (status, body) = json_of(reject_submission(State(state.clone()), request("a", None)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reviewState"], "REJECTED");
    assert_eq!(body["data"]["review"]["comments"], "No reason provided");

    let (status, body) = json_of(approve_submission(State(state), request("a", None)).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Submission is not in pending status. Current status: REJECTED");
}

#[tokio::test]
async fn unknown_submission_is_404() {
    let (status, body) = json_of(approve_submission(State(test_app_state()), request("nope", None)).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Submission not found");
}

#[tokio::test]
async fn blank_submission_id_is_400() {
    let (status, body) = json_of(reject_submission(State(test_app_state()), request("  ", None)).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "submissionId is required");
}

// =============================================================================
// audit
// =============================================================================

#[tokio::test]
async fn audit_log_includes_review_events() {
    let state = test_app_state();
    seed_entry_for(&state, "a", Some("1"), 150.0, datetime!(2025-01-01 0:00 UTC)).await;
    seed_entry_for(&state, "b", Some("1"), 80.0, datetime!(2025-01-02 0:00 UTC)).await;
    let _ = approve_submission(State(state.clone()), request("a", None)).await;

    let Json(env) = audit_transactions(State(state)).await;
    let log = env.data.unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].kind, solvency::model::TransactionKind::Approval);
    assert_eq!(log[0].submission_id, "a");
}
