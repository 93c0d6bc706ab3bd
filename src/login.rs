//! Role-aware login flow.
//!
//! ARCHITECTURE
//! ============
//! Regulator and admin sign-ins are checked locally against configured
//! credential pairs and never touch the network. Insurer sign-ins are
//! delegated to `POST /api/login`; a successful response becomes a session
//! and is persisted through the context's store.
//!
//! The flow moves `Idle → Submitting → {Authenticated, Failed}`. While a
//! submit is in flight further submits are refused with
//! [`LoginError::InFlight`] rather than queued.

use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

use crate::api::{ApiClient, ApiError};
use crate::config::{PortalConfig, RoleCredentials};
use crate::model::{LoginCredentials, Role, User};
use crate::session::{Session, SessionContext, StorageError};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const LOGIN_FAILED: &str = "Login failed";
pub const CONNECTIVITY: &str = "Unable to reach the server. Please check your connection.";

// =============================================================================
// REQUEST / OUTCOME
// =============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self { email: email.into(), password: password.into(), role }
    }
}

/// View the caller should move to after a successful sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    InsurerDashboard,
    Audit,
    Admin,
}

impl Destination {
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Insurer => Self::InsurerDashboard,
            Role::Regulator => Self::Audit,
            Role::Admin => Self::Admin,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::InsurerDashboard => "/dashboard",
            Self::Audit => "/audit",
            Self::Admin => "/admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub session: Session,
    pub destination: Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Submitting,
    Authenticated,
    Failed,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{}", describe_fields(.0))]
    Validation(Vec<FieldError>),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Rejected(String),
    #[error("Unable to reach the server. Please check your connection.")]
    Connectivity,
    #[error("a login attempt is already in progress")]
    InFlight,
    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
    #[error("unexpected login response: {0}")]
    Unexpected(String),
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; ")
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(_) => Self::Connectivity,
            ApiError::Server { message, .. } => Self::Rejected(message.unwrap_or_else(|| LOGIN_FAILED.to_owned())),
            ApiError::Rejected(message) => Self::Rejected(message),
            ApiError::Decode(detail) => Self::Unexpected(detail),
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Syntactic email check: one `@`, non-empty local part, dotted domain, no
/// whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Collect every field error at once.
///
/// # Errors
///
/// Returns [`LoginError::Validation`] listing each failing field.
pub fn validate(request: &LoginRequest) -> Result<(), LoginError> {
    let mut errors = Vec::new();
    if request.email.trim().is_empty() {
        errors.push(FieldError { field: Field::Email, message: "Email is required" });
    } else if !is_valid_email(&request.email) {
        errors.push(FieldError { field: Field::Email, message: "Enter a valid email address" });
    }
    if request.password.is_empty() {
        errors.push(FieldError { field: Field::Password, message: "Password is required" });
    }
    if errors.is_empty() { Ok(()) } else { Err(LoginError::Validation(errors)) }
}

/// Compare a submitted pair against the configured one over SHA-256 digests.
fn credentials_match(expected: &RoleCredentials, email: &str, password: &str) -> bool {
    digest_eq(&expected.email, email) & digest_eq(&expected.password, password)
}

/// Equality over SHA-256 digests of both sides, folded without early exit.
#[must_use]
pub fn digest_eq(a: &str, b: &str) -> bool {
    let da = Sha256::digest(a.as_bytes());
    let db = Sha256::digest(b.as_bytes());
    da.iter().zip(db.iter()).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Session user for a locally verified role.
fn local_user(role: Role, email: &str) -> User {
    let username = email.split('@').next().unwrap_or(email);
    let mut user = User::new(format!("{role}-local"), username, role);
    user.email = Some(email.to_owned());
    user
}

// =============================================================================
// FLOW
// =============================================================================

pub struct LoginFlow {
    api: ApiClient,
    regulator: Option<RoleCredentials>,
    admin: Option<RoleCredentials>,
    phase: Mutex<LoginPhase>,
}

impl LoginFlow {
    #[must_use]
    pub fn new(api: ApiClient, regulator: Option<RoleCredentials>, admin: Option<RoleCredentials>) -> Self {
        Self { api, regulator, admin, phase: Mutex::new(LoginPhase::Idle) }
    }

    #[must_use]
    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(
            ApiClient::new(config.api_base_url.clone()),
            config.credentials_for(Role::Regulator).cloned(),
            config.credentials_for(Role::Admin).cloned(),
        )
    }

    #[must_use]
    pub fn phase(&self) -> LoginPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one sign-in attempt and, on success, install the session in `ctx`.
    ///
    /// Failures leave `ctx` and its storage untouched. Nothing is retried.
    ///
    /// # Errors
    ///
    /// See [`LoginError`]; validation failures are reported before the flow
    /// enters `Submitting`.
    pub async fn submit(&self, request: &LoginRequest, ctx: &mut SessionContext) -> Result<LoginOutcome, LoginError> {
        validate(request)?;
        let guard = self.begin()?;
        let result = self.authenticate(request, ctx).await;
        match &result {
            Ok(outcome) => {
                tracing::info!(role = %request.role, destination = outcome.destination.path(), "login succeeded");
            }
            Err(e) => tracing::warn!(role = %request.role, error = %e, "login failed"),
        }
        guard.finish(result.is_ok());
        result
    }

    fn begin(&self) -> Result<SubmitGuard<'_>, LoginError> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase == LoginPhase::Submitting {
            return Err(LoginError::InFlight);
        }
        *phase = LoginPhase::Submitting;
        Ok(SubmitGuard { phase: &self.phase, finished: false })
    }

    async fn authenticate(&self, request: &LoginRequest, ctx: &mut SessionContext) -> Result<LoginOutcome, LoginError> {
        let role = request.role;
        let session = match role {
            Role::Regulator | Role::Admin => {
                let expected = match role {
                    Role::Regulator => self.regulator.as_ref(),
                    _ => self.admin.as_ref(),
                };
                let Some(expected) = expected else {
                    tracing::warn!(%role, "no credentials configured for role");
                    return Err(LoginError::InvalidCredentials);
                };
                if !credentials_match(expected, &request.email, &request.password) {
                    return Err(LoginError::InvalidCredentials);
                }
                ctx.establish(local_user(role, &request.email), role, false)?.clone()
            }
            Role::Insurer => {
                let credentials = LoginCredentials { email: request.email.clone(), password: request.password.clone() };
                let user = self.api.login(&credentials).await?;
                ctx.establish(user, Role::Insurer, true)?.clone()
            }
        };
        Ok(LoginOutcome { session, destination: Destination::for_role(role) })
    }
}

/// Holds the flow in `Submitting`; a guard dropped without `finish` returns
/// the flow to `Idle`.
struct SubmitGuard<'a> {
    phase: &'a Mutex<LoginPhase>,
    finished: bool,
}

impl SubmitGuard<'_> {
    fn finish(mut self, authenticated: bool) {
        let next = if authenticated { LoginPhase::Authenticated } else { LoginPhase::Failed };
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = next;
        self.finished = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = LoginPhase::Idle;
        }
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
