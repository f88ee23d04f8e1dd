// handlers/protected/program/update.rs - PUT /api/v1/programs/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::NOT_FOUND;
use crate::database::models::{Program, UpdateProgramInput};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::{body, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

pub async fn program_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProgramInput>, JsonRejection>,
) -> ApiResult<Program> {
    let id = parse_id(&id, NOT_FOUND)?;

    let mut program = state
        .store
        .find_program(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching program", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let patch = body(payload)?.validate()?;

    program.apply(patch);
    let program = state.store.save_program(&program).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error updating program", other),
    })?;

    tracing::info!(program_id = id, "Program updated");
    Ok(ApiResponse::ok("Program updated successfully", program))
}
