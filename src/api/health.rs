//! Health and status endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::PollStatus;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "FitRadar API",
        "status": "running",
    }))
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "fitradar".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

/// GET /api/polling-status response
#[derive(Debug, Serialize)]
pub struct PollingStatusResponse {
    pub success: bool,
    pub status: PollStatus,
}

/// GET /api/polling-status
pub async fn polling_status(State(state): State<AppState>) -> Json<PollingStatusResponse> {
    Json(PollingStatusResponse {
        success: true,
        status: state.poller.status().await,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/polling-status", get(polling_status))
}
