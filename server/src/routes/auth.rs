//! Auth routes: `POST /api/login`.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use solvency::model::{ErrorBody, LoginResponse, User};

use crate::services::accounts::AccountError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default, alias = "username")]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

fn success(user: User, message: &str) -> Response {
    (StatusCode::OK, Json(LoginResponse { user, message: Some(message.to_owned()) })).into_response()
}

/// `POST /api/login`: verify email/username + password.
///
/// Unknown logins are provisioned as insurers when the server allows it.
pub async fn login(State(state): State<AppState>, body: Result<Json<LoginBody>, JsonRejection>) -> Response {
    let Ok(Json(body)) = body else {
        return error(StatusCode::BAD_REQUEST, "No data provided");
    };
    let email = body.email.map(|e| e.trim().to_owned()).filter(|e| !e.is_empty());
    let password = body.password.filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (email, password) else {
        return error(StatusCode::BAD_REQUEST, "Email and password required");
    };

    let mut accounts = state.accounts.write().await;
    match accounts.verify(&email, &password) {
        Ok(user) => {
            tracing::info!(username = %user.username, role = %user.role, "login succeeded");
            success(user, "Login successful")
        }
        Err(AccountError::UnknownAccount) if state.config.auto_provision => {
            match accounts.provision_insurer(&email, &password) {
                Ok(user) => success(user, "User created and logged in"),
                Err(e) => error(StatusCode::CONFLICT, e.to_string()),
            }
        }
        Err(e) => {
            tracing::warn!(login = %email, error = %e, "login rejected");
            error(StatusCode::UNAUTHORIZED, e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
