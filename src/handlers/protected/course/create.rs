// handlers/protected/course/create.rs - POST /api/v1/courses handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;

use crate::auth::Identity;
use crate::cache::keys;
use crate::database::models::{Course, CreateCourseInput};
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

pub async fn course_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateCourseInput>, JsonRejection>,
) -> ApiResult<Course> {
    let new_course = body(payload)?.validate()?;

    let course = state
        .store
        .create_course(&new_course)
        .await
        .map_err(|e| ApiError::persistence("Error creating course", e))?;

    state.cache.delete(keys::ALL_COURSES).await;
    info!(course_id = course.meta.id, user_id = identity.user_id, "Course created");

    Ok(ApiResponse::ok("Course created successfully", course))
}
