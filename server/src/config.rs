//! Server configuration parsed from environment variables.

use crate::services::compliance::DEFAULT_MIN_RATIO;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid SOLVENCY_MIN_RATIO: {0} (expected a positive number)")]
    InvalidMinRatio(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Minimum solvency ratio (percent) for a submission to be compliant.
    pub min_ratio: f64,
    /// Create an insurer account on first login with an unknown email.
    pub auto_provision: bool,
    /// Password given to the seeded directory accounts. Without it they
    /// cannot sign in.
    pub seed_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, min_ratio: DEFAULT_MIN_RATIO, auto_provision: false, seed_password: None }
    }
}

impl ServerConfig {
    /// Build from environment.
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `SOLVENCY_MIN_RATIO`: default 100
    /// - `SOLVENCY_AUTO_PROVISION`: boolean, default false
    /// - `SOLVENCY_SEED_PASSWORD`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };
        let min_ratio = match lookup("SOLVENCY_MIN_RATIO") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| ConfigError::InvalidMinRatio(raw.clone()))?,
            None => DEFAULT_MIN_RATIO,
        };
        let auto_provision = lookup("SOLVENCY_AUTO_PROVISION")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(false);
        let seed_password = lookup("SOLVENCY_SEED_PASSWORD").filter(|v| !v.is_empty());

        Ok(Self { port, min_ratio, auto_provision, seed_password })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
