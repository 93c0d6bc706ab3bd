//! REST client for the portal backend.
//!
//! ERROR HANDLING
//! ==============
//! Every call is a single attempt. Non-2xx responses become
//! [`ApiError::Server`] carrying the server's `message` (or `error`) text;
//! a 2xx envelope with `success: false` becomes [`ApiError::Rejected`]; a 2xx
//! body of the wrong shape becomes [`ApiError::Decode`]. Transport failures
//! stay as [`ApiError::Network`] so callers can report connectivity.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{
    AuditTransaction, ComplianceStatus, IntegrityReport, LoginCredentials, LoginResponse, NewSubmission,
    ReviewRequest, Submission, SubmissionRecord, User,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{}", describe_server(.status, .message))]
    Server { status: u16, message: Option<String> },
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the backend could not be reached at all.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

fn describe_server(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("HTTP error! status: {status}"),
    }
}

/// Pull a human-readable error out of a JSON body: `message` first, then `error`.
fn error_text(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Client rooted at `base_url` (scheme + host, no trailing `/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http: reqwest::Client::new(), base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/login`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Server`] carries the `error` field of a failure body
    /// verbatim, or `None` when the body has none.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ApiError> {
        tracing::debug!(email = %credentials.email, "posting login");
        let resp = self.http.post(self.url("/api/login")).json(credentials).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(ToOwned::to_owned));
            return Err(ApiError::Server { status: status.as_u16(), message });
        }

        let parsed: LoginResponse = serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(parsed.user)
    }

    /// `GET /api/submissions`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn get_submissions(&self) -> Result<Vec<Submission>, ApiError> {
        let resp = self.http.get(self.url("/api/submissions")).send().await?;
        let submissions: Vec<Submission> = unwrap_envelope(resp).await?;
        tracing::debug!(count = submissions.len(), "fetched submissions");
        Ok(submissions)
    }

    /// `POST /api/submissions`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn create_submission(&self, payload: &NewSubmission) -> Result<Submission, ApiError> {
        let submission: Submission = self.post_envelope("/api/submissions", payload).await?;
        tracing::info!(id = %submission.id, status = %submission.status, "submission recorded");
        Ok(submission)
    }

    /// `GET /api/compliance/status`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn compliance_status(&self) -> Result<ComplianceStatus, ApiError> {
        self.get_envelope("/api/compliance/status").await
    }

    /// `GET /api/insurers/{insurer_id}/submissions`, newest first.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn submission_history(
        &self,
        insurer_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SubmissionRecord>, ApiError> {
        let mut req = self.http.get(self.url(&format!("/api/insurers/{insurer_id}/submissions")));
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        unwrap_envelope(req.send().await?).await
    }

    /// `GET /api/submissions/{id}/verify`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn verify_submission(&self, id: &str) -> Result<IntegrityReport, ApiError> {
        self.get_envelope(&format!("/api/submissions/{id}/verify")).await
    }

    /// `GET /api/regulator/pending`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn pending_submissions(&self) -> Result<Vec<SubmissionRecord>, ApiError> {
        self.get_envelope("/api/regulator/pending").await
    }

    /// `POST /api/regulator/approve`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn approve_submission(&self, request: &ReviewRequest) -> Result<SubmissionRecord, ApiError> {
        let record: SubmissionRecord = self.post_envelope("/api/regulator/approve", request).await?;
        tracing::info!(id = %record.submission.id, state = %record.review_state, "submission approved");
        Ok(record)
    }

    /// `POST /api/regulator/reject`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn reject_submission(&self, request: &ReviewRequest) -> Result<SubmissionRecord, ApiError> {
        let record: SubmissionRecord = self.post_envelope("/api/regulator/reject", request).await?;
        tracing::info!(id = %record.submission.id, state = %record.review_state, "submission rejected");
        Ok(record)
    }

    /// `GET /api/audit/transactions`.
    ///
    /// # Errors
    ///
    /// See the module-level error handling notes.
    pub async fn audit_transactions(&self) -> Result<Vec<AuditTransaction>, ApiError> {
        self.get_envelope("/api/audit/transactions").await
    }

    /// `GET /healthz`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] for any non-2xx status.
    pub async fn health(&self) -> Result<(), ApiError> {
        let resp = self.http.get(self.url("/healthz")).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Server { status: status.as_u16(), message: None });
        }
        Ok(())
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)).send().await?;
        unwrap_envelope(resp).await
    }

    async fn post_envelope<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        unwrap_envelope(resp).await
    }
}

/// Unwrap a `{success, data}` envelope.
async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    let parsed = serde_json::from_str::<Value>(&body);

    if !status.is_success() {
        let message = parsed.ok().as_ref().and_then(error_text);
        tracing::warn!(status = status.as_u16(), ?message, "backend returned error status");
        return Err(ApiError::Server { status: status.as_u16(), message });
    }

    let mut value = parsed.map_err(|e| ApiError::Decode(e.to_string()))?;
    match value.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let message = error_text(&value).unwrap_or_else(|| "request was not successful".to_owned());
            return Err(ApiError::Rejected(message));
        }
        None => return Err(ApiError::Decode("missing `success` flag".to_owned())),
    }

    let data = value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode("missing `data` field".to_owned()))?;
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
