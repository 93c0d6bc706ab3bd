mod config;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid server configuration");
    let port = config.port;
    if config.seed_password.is_none() {
        tracing::warn!("SOLVENCY_SEED_PASSWORD not set, seeded accounts cannot sign in");
    }

    let state = state::AppState::seeded(config);
    let accounts = state.accounts.read().await.len();

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, accounts, "solvency backend listening");
    axum::serve(listener, app).await.expect("server failed");
}
