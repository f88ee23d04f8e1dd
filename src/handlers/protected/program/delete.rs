// handlers/protected/program/delete.rs - DELETE /api/v1/programs/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn program_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, NOT_FOUND)?;

    state
        .store
        .find_program(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching program", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    state.store.delete_program(id).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error deleting program", other),
    })?;

    tracing::info!(program_id = id, "Program deleted");
    Ok(ApiResponse::empty("Program deleted successfully"))
}
