// handlers/protected/course/delete.rs - DELETE /api/v1/courses/:id handler

use axum::extract::{Path, State};
use tracing::info;

use super::NOT_FOUND;
use crate::cache::keys;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn course_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id, NOT_FOUND)?;

    state
        .store
        .find_course(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching course", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    state.store.delete_course(id).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error deleting course", other),
    })?;

    state.cache.delete(keys::ALL_COURSES).await;
    state.cache.delete(&keys::course(id)).await;
    info!(course_id = id, "Course deleted");

    Ok(ApiResponse::empty("Course deleted successfully"))
}
