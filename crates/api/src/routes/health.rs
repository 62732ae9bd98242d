use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the workflow template loaded at startup.
    pub workflow_loaded: bool,
}

/// GET /health -- returns service status and template readiness.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let workflow_loaded = state.workflow.is_some();

    let status = if workflow_loaded { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        workflow_loaded,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
