// handlers/protected/material/list.rs - GET /api/v1/materials handler

use axum::extract::State;

use crate::database::models::Material;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn material_list(State(state): State<AppState>) -> ApiResult<Vec<Material>> {
    let materials = state
        .store
        .list_materials()
        .await
        .map_err(|e| ApiError::persistence("Error fetching materials", e))?;

    Ok(ApiResponse::ok("Materials found successfully", materials))
}
