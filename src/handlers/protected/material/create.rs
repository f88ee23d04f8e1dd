// handlers/protected/material/create.rs - POST /api/v1/materials handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::debug;

use crate::auth::Identity;
use crate::database::models::{CreateMaterialInput, Material};
use crate::database::create_material_tree;
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/// Creates the material with its topics and videos. Nothing is stored
/// unless every row is.
pub async fn material_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateMaterialInput>, JsonRejection>,
) -> ApiResult<Material> {
    let tree = body(payload)?.validate()?;
    debug!(user_id = identity.user_id, title = %tree.material.title, "Creating material");

    let material = create_material_tree(state.store.as_ref(), &tree)
        .await
        .map_err(|e| ApiError::persistence("Error creating material", e))?;

    Ok(ApiResponse::ok("Material created successfully", material))
}
