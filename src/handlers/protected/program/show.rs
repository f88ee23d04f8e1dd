// handlers/protected/program/show.rs - GET /api/v1/programs/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::models::Program;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn program_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Program> {
    let id = parse_id(&id, NOT_FOUND)?;

    let program = state
        .store
        .find_program(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching program", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok("Program found successfully", program))
}
