// handlers/protected/material/update.rs - PUT /api/v1/materials/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::NOT_FOUND;
use crate::database::models::{Material, UpdateMaterialInput};
use crate::database::{update_material_tree, DatabaseError};
use crate::error::ApiError;
use crate::handlers::utils::{body, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/// Sparse update. A non-empty `content` or `videoCourses` list replaces
/// that whole child set; an empty or missing one leaves it alone.
pub async fn material_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMaterialInput>, JsonRejection>,
) -> ApiResult<Material> {
    let id = parse_id(&id, NOT_FOUND)?;

    let mut material = state
        .store
        .find_material(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching material", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let patch = body(payload)?.validate()?;

    material.apply(&patch);
    let material = update_material_tree(state.store.as_ref(), &material, &patch)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
            other => ApiError::persistence("Error updating material", other),
        })?;

    Ok(ApiResponse::ok("Material updated successfully", material))
}
