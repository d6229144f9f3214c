use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{enroll::enroll_speaker, profile::profile_status, verify::verify_speaker};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/enroll", post(enroll_speaker))
        .route("/v1/verify", post(verify_speaker))
        .route("/v1/profile", get(profile_status))
        .with_state(state)
}

/// Binds the listener and serves until the task is stopped.
pub async fn create_app_routes(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let bind = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(address = %bind, "speaker verification HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}
