//! Solvency computation and submission fingerprinting.
//!
//! `solvency_ratio = capital / liabilities × 100`, rounded to four decimals.
//! A submission is compliant iff its ratio meets the configured minimum.
//! Each recorded submission carries a SHA-256 fingerprint over
//! `capital|liabilities|insurer|timestamp|ratio`.

use sha2::{Digest, Sha256};
use solvency::model::{NewSubmission, Submission, SubmissionStatus};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use uuid::Uuid;

pub const DEFAULT_MIN_RATIO: f64 = 100.0;

/// Insurer label hashed when a submission names no insurer.
const ANONYMOUS_INSURER: &str = "anonymous";

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("capital must not be negative")]
    NegativeCapital,
    #[error("liabilities must be greater than zero")]
    NonPositiveLiabilities,
    #[error("date must be an ISO-8601 date (YYYY-MM-DD), got '{0}'")]
    InvalidDate(String),
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[must_use]
pub fn solvency_ratio(capital: f64, liabilities: f64) -> f64 {
    let ratio = capital / liabilities * 100.0;
    (ratio * 10_000.0).round() / 10_000.0
}

#[must_use]
pub fn compliance_for(ratio: f64, min_ratio: f64) -> SubmissionStatus {
    if ratio >= min_ratio { SubmissionStatus::Compliant } else { SubmissionStatus::NonCompliant }
}

#[must_use]
pub fn submission_hash(capital: f64, liabilities: f64, insurer: &str, timestamp: &str, ratio: f64) -> String {
    let data = format!("{capital}|{liabilities}|{insurer}|{timestamp}|{ratio}");
    let digest = Sha256::digest(data.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Check a payload before anything is computed from it.
pub fn validate(payload: &NewSubmission) -> Result<(), SubmissionError> {
    if !payload.capital.is_finite() {
        return Err(SubmissionError::NotFinite("capital"));
    }
    if !payload.liabilities.is_finite() {
        return Err(SubmissionError::NotFinite("liabilities"));
    }
    if payload.capital < 0.0 {
        return Err(SubmissionError::NegativeCapital);
    }
    if payload.liabilities <= 0.0 {
        return Err(SubmissionError::NonPositiveLiabilities);
    }
    time::Date::parse(payload.date.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| SubmissionError::InvalidDate(payload.date.clone()))?;
    Ok(())
}

/// Fingerprint of a submission recorded for `insurer` at `recorded_at`.
pub fn fingerprint(
    capital: f64,
    liabilities: f64,
    insurer: Option<&str>,
    recorded_at: OffsetDateTime,
    ratio: f64,
) -> Result<String, SubmissionError> {
    let timestamp = recorded_at.format(&Rfc3339)?;
    let insurer = insurer.unwrap_or(ANONYMOUS_INSURER);
    Ok(submission_hash(capital, liabilities, insurer, &timestamp, ratio))
}

/// Validate `payload` and derive the recorded submission at time `now`.
///
/// A ratio that overflows `f64` is rejected; it would serialize as `null`.
pub fn record(payload: &NewSubmission, min_ratio: f64, now: OffsetDateTime) -> Result<Submission, SubmissionError> {
    validate(payload)?;
    let ratio = solvency_ratio(payload.capital, payload.liabilities);
    if !ratio.is_finite() {
        return Err(SubmissionError::NotFinite("solvencyRatio"));
    }
    let transaction_hash =
        fingerprint(payload.capital, payload.liabilities, payload.insurer_id.as_deref(), now, ratio)?;

    Ok(Submission {
        id: Uuid::new_v4().to_string(),
        capital: payload.capital,
        liabilities: payload.liabilities,
        date: payload.date.trim().to_owned(),
        solvency_ratio: ratio,
        status: compliance_for(ratio, min_ratio),
        transaction_hash,
    })
}

#[cfg(test)]
#[path = "compliance_test.rs"]
mod tests;
