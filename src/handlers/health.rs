//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use super::AppState;

/// Liveness; does not touch dependencies
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// Readiness; 503 when the database is unreachable
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = state.services.health_check().await;

    if health.is_healthy() {
        (StatusCode::OK, Json(json!({ "status": "ready", "services": health })))
    } else {
        let issues = health.get_issues();
        warn!(issues = ?issues, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "issues": issues, "services": health })),
        )
    }
}
