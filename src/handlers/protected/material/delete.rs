// handlers/protected/material/delete.rs - DELETE /api/v1/materials/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::{delete_material_tree, DatabaseError};
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Removes the material together with its topics and videos.
pub async fn material_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, NOT_FOUND)?;

    state
        .store
        .find_material(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching material", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    delete_material_tree(state.store.as_ref(), id)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
            other => ApiError::persistence("Error deleting material", other),
        })?;

    Ok(ApiResponse::empty("Material deleted successfully"))
}
