// handlers/protected/content/by_material.rs - GET /api/v1/content/material/:material_id

use axum::extract::{Path, State};

use crate::database::models::ContentTopic;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Topics of one material ordered by `order`. An unknown material yields an
/// empty list.
pub async fn content_by_material(
    State(state): State<AppState>,
    Path(material_id): Path<String>,
) -> ApiResult<Vec<ContentTopic>> {
    let material_id = parse_id(&material_id, "Content topics not found")?;

    let topics = state
        .store
        .list_content_topics(material_id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching content topics", e))?;

    Ok(ApiResponse::ok("Content topics found successfully", topics))
}
