// handlers/protected/content/update.rs - PUT /api/v1/content/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::NOT_FOUND;
use crate::database::models::{ContentTopic, UpdateContentTopicInput};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::{body, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/// Sparse update. `material_id` cannot be changed here.
pub async fn content_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateContentTopicInput>, JsonRejection>,
) -> ApiResult<ContentTopic> {
    let id = parse_id(&id, NOT_FOUND)?;

    let mut topic = state
        .store
        .find_content_topic(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching content topic", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let patch = body(payload)?.validate()?;

    topic.apply(patch);
    let topic = state.store.save_content_topic(&topic).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error updating content topic", other),
    })?;

    Ok(ApiResponse::ok("Content topic updated successfully", topic))
}
