// handlers/protected/material/show.rs - GET /api/v1/materials/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::models::Material;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn material_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Material> {
    let id = parse_id(&id, NOT_FOUND)?;

    let material = state
        .store
        .find_material(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching material", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok("Material found successfully", material))
}
