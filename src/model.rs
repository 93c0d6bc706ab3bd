//! Domain model shared by the client, the CLI and the backend.
//!
//! Wire format is camelCase JSON. These are transient view models; the
//! backend is the authoritative store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// USER
// =============================================================================

/// Closed set of portal roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Insurer,
    Regulator,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insurer => "insurer",
            Self::Regulator => "regulator",
            Self::Admin => "admin",
        }
    }

    /// Human-facing label used when tagging a session.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Insurer => "Insurer",
            Self::Regulator => "Regulator",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insurer" => Ok(Self::Insurer),
            "regulator" => Ok(Self::Regulator),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// Insurer size band. Only meaningful for insurer accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsurerSize {
    #[serde(alias = "small")]
    Small,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "large")]
    Large,
}

/// Portal account as returned by the backend.
///
/// `region` and `size` only carry meaning for insurers; the type does not
/// enforce that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<InsurerSize>,
}

impl User {
    /// Minimal account with no profile fields.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
            email: None,
            business_name: None,
            registration_number: None,
            region: None,
            size: None,
        }
    }

    /// True for insurers that carry both region and size.
    #[must_use]
    pub fn is_insurer_profile_complete(&self) -> bool {
        self.role == Role::Insurer && self.region.is_some() && self.size.is_some()
    }
}

// =============================================================================
// SUBMISSIONS
// =============================================================================

/// Compliance verdict computed by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Compliant,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
}

impl SubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::NonCompliant => "Non-Compliant",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded financial submission. `solvency_ratio` and `status` are derived
/// server-side; the client never computes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub capital: f64,
    pub liabilities: f64,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub date: String,
    pub solvency_ratio: f64,
    pub status: SubmissionStatus,
    pub transaction_hash: String,
}

/// Payload for `POST /api/submissions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub capital: f64,
    pub liabilities: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
}

impl NewSubmission {
    #[must_use]
    pub fn new(capital: f64, liabilities: f64, date: impl Into<String>) -> Self {
        Self { capital, liabilities, date: date.into(), insurer_id: None }
    }
}

/// Point-in-time compliance snapshot. Shape-compatible with, but distinct
/// from, [`Submission`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStatus {
    pub status: SubmissionStatus,
    pub solvency_ratio: f64,
    pub capital: f64,
    pub liabilities: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_check: OffsetDateTime,
}

/// A submission payload captured while offline, with the client timestamp.
///
/// Nothing produces or drains these yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineRequest {
    pub payload: NewSubmission,
    #[serde(with = "time::serde::rfc3339")]
    pub queued_at: OffsetDateTime,
}

impl OfflineRequest {
    /// Stamp a payload with the current UTC time.
    #[must_use]
    pub fn now(payload: NewSubmission) -> Self {
        Self { payload, queued_at: OffsetDateTime::now_utc() }
    }
}

// =============================================================================
// REVIEW
// =============================================================================

/// Where a submission stands in the regulator review workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewState {
    #[serde(rename = "INSURER_SUBMITTED")]
    Pending,
    #[serde(rename = "REGULATOR_APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ReviewState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "INSURER_SUBMITTED",
            Self::Approved => "REGULATOR_APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
        }
    }

    /// State a pending submission moves to under this decision.
    #[must_use]
    pub fn outcome(self) -> ReviewState {
        match self {
            Self::Approve => ReviewState::Approved,
            Self::Reject => ReviewState::Rejected,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/regulator/approve` and `/reject`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub submission_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl ReviewRequest {
    #[must_use]
    pub fn new(submission_id: impl Into<String>) -> Self {
        Self { submission_id: submission_id.into(), regulator_id: None, comments: None }
    }
}

/// A regulator decision, fingerprinted over the submission hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub decision: ReviewDecision,
    pub regulator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub reviewed_at: OffsetDateTime,
    pub approval_hash: String,
}

/// A submission as the ledger holds it: the wire submission plus who filed
/// it, when, and where it stands in review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub submission: Submission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
    pub review_state: ReviewState,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<Review>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Submission,
    Approval,
    Rejection,
}

impl TransactionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submission => "SUBMISSION",
            Self::Approval => "APPROVAL",
            Self::Rejection => "REJECTION",
        }
    }
}

/// One line of the audit log. Each submission contributes a `Submission`
/// entry, plus an `Approval` or `Rejection` once reviewed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTransaction {
    pub id: String,
    pub kind: TransactionKind,
    pub transaction_hash: String,
    pub submission_id: String,
    pub review_state: ReviewState,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulator_id: Option<String>,
    pub capital: f64,
    pub liabilities: f64,
    pub solvency_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Result of recomputing a submission's fingerprints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub submission_id: String,
    pub stored_hash: String,
    pub recomputed_hash: String,
    pub intact: bool,
    /// `None` until the submission has been reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_intact: Option<bool>,
}

impl IntegrityReport {
    /// True when every fingerprint present recomputes to its stored value.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.intact && self.approval_intact.unwrap_or(true)
    }
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// `{success, data}` wrapper used by the submissions endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()) }
    }
}

/// Body of `POST /api/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// Success body of `POST /api/login`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failure body of `POST /api/login`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
