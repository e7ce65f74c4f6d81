//! Health check routes
//!
//! Liveness reports the sender's running flag alongside the build info;
//! readiness requires the database to answer and reports the outbox backlog
//! depth so probes can see a stuck dispatcher.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    environment: String,
    sender_running: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadyResponse {
    status: String,
    sender_running: bool,
    pending_outbox_entries: i64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        sender_running: state.control.status().await,
    })
}

async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, (StatusCode, String)> {
    // The backlog count doubles as the database ping.
    let (pending,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM outbox WHERE sent = FALSE")
        .fetch_one(&state.db.pool)
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Database not ready: {}", e),
            )
        })?;

    Ok(Json(ReadyResponse {
        status: "ready".to_string(),
        sender_running: state.control.status().await,
        pending_outbox_entries: pending,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}
