//! Regulator routes: review queue, decisions and the audit log.
//!
//! The backend trusts callers here; regulator identity is checked by the
//! client-side login flow.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use solvency::model::{AuditTransaction, Envelope, ReviewDecision, ReviewRequest, SubmissionRecord};
use time::OffsetDateTime;

use super::submissions::failure;
use crate::services::review::{self, ReviewError};
use crate::state::AppState;

pub(crate) fn review_error_to_status(err: &ReviewError) -> StatusCode {
    match err {
        ReviewError::MissingId | ReviewError::NotPending(_) => StatusCode::BAD_REQUEST,
        ReviewError::NotFound => StatusCode::NOT_FOUND,
        ReviewError::Timestamp(_) | ReviewError::Submission(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/regulator/pending`: submissions awaiting review, newest first.
pub async fn pending_submissions(State(state): State<AppState>) -> Json<Envelope<Vec<SubmissionRecord>>> {
    let ledger = state.ledger.read().await;
    let data = review::pending(&ledger);
    tracing::debug!(count = data.len(), "listing pending submissions");
    Json(Envelope::ok(data))
}

/// `POST /api/regulator/approve`.
pub async fn approve_submission(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response {
    decide(state, ReviewDecision::Approve, body).await
}

/// `POST /api/regulator/reject`.
pub async fn reject_submission(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response {
    decide(state, ReviewDecision::Reject, body).await
}

async fn decide(
    state: AppState,
    decision: ReviewDecision,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match apply(&state, decision, request).await {
        Ok(record) => {
            tracing::info!(
                id = %record.submission.id,
                %decision,
                state = %record.review_state,
                "submission reviewed"
            );
            Json(Envelope::ok(record)).into_response()
        }
        Err(e) => {
            tracing::warn!(%decision, error = %e, "review rejected");
            failure(review_error_to_status(&e), e.to_string())
        }
    }
}

async fn apply(
    state: &AppState,
    decision: ReviewDecision,
    request: ReviewRequest,
) -> Result<SubmissionRecord, ReviewError> {
    let id = request.submission_id.trim();
    if id.is_empty() {
        return Err(ReviewError::MissingId);
    }
    let mut ledger = state.ledger.write().await;
    let entry = ledger
        .iter_mut()
        .find(|e| e.submission.id == id)
        .ok_or(ReviewError::NotFound)?;
    review::decide(
        entry,
        decision,
        request.regulator_id.as_deref(),
        request.comments,
        OffsetDateTime::now_utc(),
    )?;
    Ok(entry.to_record())
}

/// `GET /api/audit/transactions`: every submission and review event, newest
/// first.
pub async fn audit_transactions(State(state): State<AppState>) -> Json<Envelope<Vec<AuditTransaction>>> {
    let ledger = state.ledger.read().await;
    Json(Envelope::ok(review::transactions(&ledger)))
}

#[cfg(test)]
#[path = "regulator_test.rs"]
mod tests;
