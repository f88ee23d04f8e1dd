// handlers/protected/content/create.rs - POST /api/v1/content handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use crate::database::models::{ContentTopic, CreateContentTopicInput};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

pub async fn content_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateContentTopicInput>, JsonRejection>,
) -> ApiResult<ContentTopic> {
    let new_topic = body(payload)?.validate()?;

    // The parent must exist and be live; the store checks it in the same
    // statement as the insert.
    let topic = state
        .store
        .create_content_topic(&new_topic)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => ApiError::bad_request("Material not found"),
            other => ApiError::persistence("Error creating content topic", other),
        })?;

    info!(topic_id = topic.meta.id, material_id = topic.material_id, "Content topic created");
    Ok(ApiResponse::ok("Content topic created successfully", topic))
}
