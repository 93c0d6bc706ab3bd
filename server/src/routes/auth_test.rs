use axum::body::to_bytes;
use solvency::model::Role;

use super::*;
use crate::config::ServerConfig;
use crate::state::test_helpers::{SEED_PASSWORD, test_app_state};

async fn call(state: AppState, email: Option<&str>, password: Option<&str>) -> (StatusCode, serde_json::Value) {
    let body = LoginBody { email: email.map(str::to_owned), password: password.map(str::to_owned) };
    let resp = login(State(state), Ok(Json(body))).await;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn seeded_insurer_logs_in() {
    let (status, body) = call(test_app_state(), Some("cfo@maisha.co.ke"), Some(SEED_PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "maisha_insurance");
    assert_eq!(body["user"]["role"], "insurer");
    assert_eq!(body["user"]["businessName"], "Maisha Insurance");
}

#[tokio::test]
async fn username_works_as_login() {
    let (status, body) = call(test_app_state(), Some("maisha_insurance"), Some(SEED_PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "cfo@maisha.co.ke");
}

#[tokio::test]
async fn wrong_password_is_401_with_error_body() {
    let (status, body) = call(test_app_state(), Some("cfo@maisha.co.ke"), Some("bad")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid password");
}

#[tokio::test]
async fn unknown_account_is_401_without_provisioning() {
    let (status, body) = call(test_app_state(), Some("x@y.com"), Some("pw")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unknown account");
}

#[tokio::test]
async fn unknown_account_is_provisioned_when_enabled() {
    let state = AppState::seeded(ServerConfig { auto_provision: true, ..ServerConfig::default() });
    let (status, body) = call(state.clone(), Some("cfo@acme.co.ke"), Some("pw")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created and logged in");
    assert_eq!(body["user"]["username"], "cfo");

    let user = state.accounts.read().await.verify("cfo@acme.co.ke", "pw").unwrap();
    assert_eq!(user.role, Role::Insurer);
}

#[tokio::test]
async fn missing_fields_are_400() {
    let (status, body) = call(test_app_state(), Some("cfo@maisha.co.ke"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password required");

    let (status, _) = call(test_app_state(), Some("   "), Some("pw")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test]
fn login_body_accepts_username_alias() {
    let body: LoginBody = serde_json::from_str(r#"{"username":"maisha_insurance","password":"pw"}"#).unwrap();
    assert_eq!(body.email.as_deref(), Some("maisha_insurance"));
}
