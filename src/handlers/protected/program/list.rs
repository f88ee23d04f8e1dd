// handlers/protected/program/list.rs - GET /api/v1/programs handler

use axum::extract::State;

use crate::database::models::Program;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn program_list(State(state): State<AppState>) -> ApiResult<Vec<Program>> {
    let programs = state
        .store
        .list_programs()
        .await
        .map_err(|e| ApiError::persistence("Error fetching programs", e))?;

    Ok(ApiResponse::ok("Programs found successfully", programs))
}
