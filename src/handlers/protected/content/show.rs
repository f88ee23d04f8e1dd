// handlers/protected/content/show.rs - GET /api/v1/content/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::models::ContentTopic;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn content_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ContentTopic> {
    let id = parse_id(&id, NOT_FOUND)?;

    let topic = state
        .store
        .find_content_topic(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching content topic", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok("Content topic found successfully", topic))
}
