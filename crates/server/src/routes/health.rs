//! Health check endpoint.
//!
//! Returns 200 `{"status":"ok"}` while the database is reachable and 503
//! `{"status":"unavailable"}` otherwise.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.postgres_healthy().await {
        (StatusCode::OK, Json(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
            }),
        )
    }
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
