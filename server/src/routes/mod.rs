//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the `/api` surface consumed by the portal client (login, the
//! submission ledger, regulator review and audit) plus a health check, under
//! permissive CORS and HTTP request tracing.

pub mod auth;
pub mod regulator;
pub mod submissions;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/login", post(auth::login))
        .route(
            "/api/submissions",
            get(submissions::list_submissions).post(submissions::create_submission),
        )
        .route("/api/submissions/{id}/verify", get(submissions::verify_submission))
        .route("/api/insurers/{insurer_id}/submissions", get(submissions::submission_history))
        .route("/api/compliance/status", get(submissions::compliance_status))
        .route("/api/regulator/pending", get(regulator::pending_submissions))
        .route("/api/regulator/approve", post(regulator::approve_submission))
        .route("/api/regulator/reject", post(regulator::reject_submission))
        .route("/api/audit/transactions", get(regulator::audit_transactions))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers::test_app_state;

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn router_serves_login_over_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app(test_app_state())).await.unwrap();
        });

        let client = solvency::api::ApiClient::new(base);
        client.health().await.unwrap();
        let user = client
            .login(&solvency::model::LoginCredentials {
                email: "cfo@maisha.co.ke".into(),
                password: crate::state::test_helpers::SEED_PASSWORD.into(),
            })
            .await
            .unwrap();
        assert_eq!(user.username, "maisha_insurance");

        let created = client
            .create_submission(&solvency::model::NewSubmission::new(2_000.0, 1_000.0, "2025-03-31"))
            .await
            .unwrap();
        let listed = client.get_submissions().await.unwrap();
        assert_eq!(listed, vec![created]);

        let status = client.compliance_status().await.unwrap();
        assert!((status.solvency_ratio - 200.0).abs() < f64::EPSILON);
    }
}
