//! Regulator review workflow and ledger audit.
//!
//! DESIGN
//! ======
//! Every submission enters the ledger as `INSURER_SUBMITTED`. A regulator
//! moves it exactly once to `REGULATOR_APPROVED` or `REJECTED`; the decision
//! is fingerprinted as SHA-256 over
//! `submissionHash|regulatorId|decision|timestamp` so both the submission and
//! its review can be recomputed and checked later.

use sha2::{Digest, Sha256};
use solvency::login::digest_eq;
use solvency::model::{
    AuditTransaction, IntegrityReport, Review, ReviewDecision, ReviewState, SubmissionRecord, TransactionKind,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::services::compliance::{self, SubmissionError};
use crate::state::LedgerEntry;

/// Regulator id recorded when a review request names none.
pub const DEFAULT_REGULATOR_ID: &str = "regulator";

/// Comment recorded on a rejection that carries none.
const DEFAULT_REJECTION_COMMENT: &str = "No reason provided";

/// History entries returned when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("submissionId is required")]
    MissingId,
    #[error("Submission not found")]
    NotFound,
    #[error("Submission is not in pending status. Current status: {0}")]
    NotPending(ReviewState),
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[must_use]
pub fn approval_hash(submission_hash: &str, regulator_id: &str, decision: ReviewDecision, timestamp: &str) -> String {
    let data = format!("{submission_hash}|{regulator_id}|{decision}|{timestamp}");
    let digest = Sha256::digest(data.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn review_fingerprint(entry: &LedgerEntry, review: &Review) -> Result<String, ReviewError> {
    let timestamp = review.reviewed_at.format(&Rfc3339)?;
    Ok(approval_hash(&entry.submission.transaction_hash, &review.regulator_id, review.decision, &timestamp))
}

/// Apply a regulator decision to a pending entry.
pub fn decide(
    entry: &mut LedgerEntry,
    decision: ReviewDecision,
    regulator_id: Option<&str>,
    comments: Option<String>,
    now: OffsetDateTime,
) -> Result<Review, ReviewError> {
    let state = entry.review_state();
    if state != ReviewState::Pending {
        return Err(ReviewError::NotPending(state));
    }

    let regulator_id = regulator_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_REGULATOR_ID)
        .to_owned();
    let comments = comments.filter(|c| !c.trim().is_empty()).or_else(|| match decision {
        ReviewDecision::Reject => Some(DEFAULT_REJECTION_COMMENT.to_owned()),
        ReviewDecision::Approve => None,
    });

    let mut review = Review { decision, regulator_id, comments, reviewed_at: now, approval_hash: String::new() };
    review.approval_hash = review_fingerprint(entry, &review)?;
    entry.review = Some(review.clone());
    Ok(review)
}

/// Pending entries, newest first.
#[must_use]
pub fn pending(ledger: &[LedgerEntry]) -> Vec<SubmissionRecord> {
    ledger
        .iter()
        .rev()
        .filter(|e| e.review_state() == ReviewState::Pending)
        .map(LedgerEntry::to_record)
        .collect()
}

/// The most recent `limit` entries filed by `insurer_id`, newest first.
#[must_use]
pub fn history(ledger: &[LedgerEntry], insurer_id: &str, limit: usize) -> Vec<SubmissionRecord> {
    ledger
        .iter()
        .rev()
        .filter(|e| e.insurer_id.as_deref() == Some(insurer_id))
        .take(limit)
        .map(LedgerEntry::to_record)
        .collect()
}

/// Recompute the submission fingerprint and, when reviewed, the approval
/// fingerprint.
pub fn verify(entry: &LedgerEntry) -> Result<IntegrityReport, ReviewError> {
    let sub = &entry.submission;
    let recomputed_hash = compliance::fingerprint(
        sub.capital,
        sub.liabilities,
        entry.insurer_id.as_deref(),
        entry.recorded_at,
        sub.solvency_ratio,
    )?;
    let intact = digest_eq(&sub.transaction_hash, &recomputed_hash);
    let approval_intact = match &entry.review {
        Some(review) => Some(digest_eq(&review.approval_hash, &review_fingerprint(entry, review)?)),
        None => None,
    };

    Ok(IntegrityReport {
        submission_id: sub.id.clone(),
        stored_hash: sub.transaction_hash.clone(),
        recomputed_hash,
        intact,
        approval_intact,
    })
}

/// Audit log over the whole ledger, newest first.
#[must_use]
pub fn transactions(ledger: &[LedgerEntry]) -> Vec<AuditTransaction> {
    let mut log = Vec::with_capacity(ledger.len() * 2);
    for entry in ledger {
        let sub = &entry.submission;
        let base = AuditTransaction {
            id: sub.id.clone(),
            kind: TransactionKind::Submission,
            transaction_hash: sub.transaction_hash.clone(),
            submission_id: sub.id.clone(),
            review_state: entry.review_state(),
            timestamp: entry.recorded_at,
            insurer_id: entry.insurer_id.clone(),
            regulator_id: None,
            capital: sub.capital,
            liabilities: sub.liabilities,
            solvency_ratio: sub.solvency_ratio,
            comments: None,
        };

        if let Some(review) = &entry.review {
            let kind = match review.decision {
                ReviewDecision::Approve => TransactionKind::Approval,
                ReviewDecision::Reject => TransactionKind::Rejection,
            };
            log.push(AuditTransaction {
                id: format!("{}-review", sub.id),
                kind,
                transaction_hash: review.approval_hash.clone(),
                timestamp: review.reviewed_at,
                regulator_id: Some(review.regulator_id.clone()),
                comments: review.comments.clone(),
                ..base.clone()
            });
        }
        log.push(base);
    }
    log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    log
}

#[cfg(test)]
#[path = "review_test.rs"]
mod tests;
