//! Portal configuration parsed from environment variables.
//!
//! Regulator and admin credentials are supplied here rather than compiled in.
//! A role with no configured pair cannot sign in.

use std::path::PathBuf;

use crate::model::Role;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const SESSION_FILE_NAME: &str = "solvency-session.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid SOLVENCY_API_URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),
    #[error("incomplete {role} credentials: both {email_var} and {password_var} must be set")]
    IncompleteCredentials { role: Role, email_var: &'static str, password_var: &'static str },
}

/// A fixed email/password pair for a role verified on the client.
#[derive(Clone, PartialEq, Eq)]
pub struct RoleCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RoleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RoleCredentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Backend origin; `/api/...` paths are joined onto it.
    pub api_base_url: String,
    /// File holding the persisted insurer session.
    pub session_file: PathBuf,
    pub regulator: Option<RoleCredentials>,
    pub admin: Option<RoleCredentials>,
}

impl PortalConfig {
    /// Build config from process environment.
    ///
    /// Optional:
    /// - `SOLVENCY_API_URL`: default `http://127.0.0.1:5000`
    /// - `SOLVENCY_SESSION_FILE`: default `$HOME/.solvency-session.json`
    /// - `SOLVENCY_REGULATOR_EMAIL` + `SOLVENCY_REGULATOR_PASSWORD`
    /// - `SOLVENCY_ADMIN_EMAIL` + `SOLVENCY_ADMIN_PASSWORD`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a malformed API URL or a half-configured
    /// credential pair.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`PortalConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("SOLVENCY_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_base_url = normalize_base_url(&api_base_url)?;

        let session_file = lookup("SOLVENCY_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_session_file(lookup("HOME")));

        let regulator = role_credentials(
            &lookup,
            Role::Regulator,
            "SOLVENCY_REGULATOR_EMAIL",
            "SOLVENCY_REGULATOR_PASSWORD",
        )?;
        let admin = role_credentials(&lookup, Role::Admin, "SOLVENCY_ADMIN_EMAIL", "SOLVENCY_ADMIN_PASSWORD")?;

        Ok(Self { api_base_url, session_file, regulator, admin })
    }

    /// Configured pair for a client-verified role. Always `None` for insurers.
    #[must_use]
    pub fn credentials_for(&self, role: Role) -> Option<&RoleCredentials> {
        match role {
            Role::Regulator => self.regulator.as_ref(),
            Role::Admin => self.admin.as_ref(),
            Role::Insurer => None,
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            session_file: PathBuf::from(format!(".{SESSION_FILE_NAME}")),
            regulator: None,
            admin: None,
        }
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] for any other scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn default_session_file(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(format!(".{SESSION_FILE_NAME}")),
        None => PathBuf::from(format!(".{SESSION_FILE_NAME}")),
    }
}

fn role_credentials<F>(
    lookup: &F,
    role: Role,
    email_var: &'static str,
    password_var: &'static str,
) -> Result<Option<RoleCredentials>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let email = lookup(email_var).filter(|v| !v.is_empty());
    let password = lookup(password_var).filter(|v| !v.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok(Some(RoleCredentials { email, password })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::IncompleteCredentials { role, email_var, password_var }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
