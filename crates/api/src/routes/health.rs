use axum::extract::State;
use axum::{routing::get, Json, Router};
use concert_events::ConnectionStatus;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is up, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the concert store is reachable.
    pub store_healthy: bool,
    /// Connection state of the notification publisher.
    pub publisher: ConnectionStatus,
}

/// GET /health -- returns service and dependency health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.concerts.health().await;

    let status = if report.is_healthy() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy: report.store_healthy,
        publisher: report.publisher,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
