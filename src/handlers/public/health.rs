// handlers/public/health.rs - GET /health handler

use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
}

/// 200 while the store answers, 503 otherwise.
pub async fn health_get(State(state): State<AppState>) -> ApiResult<HealthReport> {
    if let Err(e) = state.store.ping().await {
        tracing::error!(error = %e, "Health check failed");
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::ok(
        "Service healthy",
        HealthReport {
            status: "ok",
            database: "ok",
            cache: state.cache.mode(),
        },
    ))
}
