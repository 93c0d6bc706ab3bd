//! Submission ledger routes.
//!
//! All responses use the `{success, data}` envelope; failures carry
//! `{success: false, message}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use solvency::model::{ComplianceStatus, Envelope, NewSubmission, Submission, SubmissionRecord};
use time::OffsetDateTime;

use super::regulator::review_error_to_status;
use crate::services::compliance::{self, SubmissionError};
use crate::services::review::{self, DEFAULT_HISTORY_LIMIT};
use crate::state::{AppState, LedgerEntry};

pub(crate) fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::<()>::failure(message))).into_response()
}

fn submission_error_to_status(err: &SubmissionError) -> StatusCode {
    match err {
        SubmissionError::Timestamp(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// `GET /api/submissions`: every submission, newest first.
pub async fn list_submissions(State(state): State<AppState>) -> Json<Envelope<Vec<Submission>>> {
    let ledger = state.ledger.read().await;
    let data: Vec<Submission> = ledger.iter().rev().map(|e| e.submission.clone()).collect();
    tracing::debug!(count = data.len(), "listing submissions");
    Json(Envelope::ok(data))
}

/// `POST /api/submissions`: validate, derive ratio/status/hash, append.
pub async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<NewSubmission>, JsonRejection>,
) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let now = OffsetDateTime::now_utc();
    let submission = match compliance::record(&payload, state.config.min_ratio, now) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "submission rejected");
            return failure(submission_error_to_status(&e), e.to_string());
        }
    };

    tracing::info!(
        id = %submission.id,
        ratio = submission.solvency_ratio,
        status = %submission.status,
        hash = %submission.transaction_hash,
        "submission recorded"
    );
    state
        .ledger
        .write()
        .await
        .push(LedgerEntry::new(submission.clone(), now, payload.insurer_id));
    (StatusCode::CREATED, Json(Envelope::ok(submission))).into_response()
}

/// `GET /api/compliance/status`: snapshot of the latest submission.
pub async fn compliance_status(State(state): State<AppState>) -> Response {
    let ledger = state.ledger.read().await;
    let Some(latest) = ledger.last() else {
        return failure(StatusCode::NOT_FOUND, "no submissions recorded");
    };
    let snapshot = ComplianceStatus {
        status: latest.submission.status,
        solvency_ratio: latest.submission.solvency_ratio,
        capital: latest.submission.capital,
        liabilities: latest.submission.liabilities,
        last_check: latest.recorded_at,
    };
    Json(Envelope::ok(snapshot)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

/// `GET /api/insurers/{insurer_id}/submissions`: one insurer's most recent
/// submissions with their review state, newest first.
pub async fn submission_history(
    State(state): State<AppState>,
    Path(insurer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Json<Envelope<Vec<SubmissionRecord>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let ledger = state.ledger.read().await;
    let data = review::history(&ledger, &insurer_id, limit);
    tracing::debug!(%insurer_id, count = data.len(), "listing submission history");
    Json(Envelope::ok(data))
}

/// `GET /api/submissions/{id}/verify`: recompute the stored fingerprints.
pub async fn verify_submission(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let ledger = state.ledger.read().await;
    let Some(entry) = ledger.iter().find(|e| e.submission.id == id) else {
        return failure(StatusCode::NOT_FOUND, "Submission not found");
    };
    match review::verify(entry) {
        Ok(report) => {
            if !report.is_verified() {
                tracing::warn!(%id, "submission failed integrity check");
            }
            Json(Envelope::ok(report)).into_response()
        }
        Err(e) => failure(review_error_to_status(&e), e.to_string()),
    }
}

#[cfg(test)]
#[path = "submissions_test.rs"]
mod tests;
