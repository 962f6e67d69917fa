//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{config::StorageBackend, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Configured storage backend
    pub backend: StorageBackend,
}

impl HealthResponse {
    fn new(status: &str, state: &AppState) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: state.config.database.backend,
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", &state))
}

/// Readiness check endpoint (checks storage connectivity)
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.services.catalog.counts().await {
        Ok(_) => (StatusCode::OK, Json(HealthResponse::new("ready", &state))),
        Err(err) => {
            tracing::warn!("Readiness check failed: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::new("unavailable", &state)))
        }
    }
}
