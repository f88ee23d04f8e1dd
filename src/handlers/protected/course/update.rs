// handlers/protected/course/update.rs - PUT /api/v1/courses/:id handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use super::NOT_FOUND;
use crate::cache::keys;
use crate::database::models::{Course, UpdateCourseInput};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::{body, parse_id};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/// Sparse update: fields left empty or zero keep their stored value.
pub async fn course_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCourseInput>, JsonRejection>,
) -> ApiResult<Course> {
    let id = parse_id(&id, NOT_FOUND)?;

    let mut course = state
        .store
        .find_course(id)
        .await
        .map_err(|e| ApiError::persistence("Error fetching course", e))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let patch = body(payload)?.validate()?;

    course.apply(patch);
    let course = state.store.save_course(&course).await.map_err(|e| match e {
        DatabaseError::NotFound(_) => ApiError::not_found(NOT_FOUND),
        other => ApiError::persistence("Error updating course", other),
    })?;

    state.cache.delete(keys::ALL_COURSES).await;
    state.cache.delete(&keys::course(id)).await;
    info!(course_id = id, "Course updated");

    Ok(ApiResponse::ok("Course updated successfully", course))
}
