// handlers/protected/content/delete.rs - DELETE /api/v1/content/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn content_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, NOT_FOUND)?;

    state.store.delete_content_topic(id).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error deleting content topic", other),
    })?;

    tracing::info!(topic_id = id, "Content topic deleted");
    Ok(ApiResponse::empty("Content topic deleted successfully"))
}
