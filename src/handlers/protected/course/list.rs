// handlers/protected/course/list.rs - GET /api/v1/courses handler

use axum::extract::State;

use crate::cache::keys;
use crate::database::models::Course;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn course_list(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    if let Some(courses) = state.cache.get::<Vec<Course>>(keys::ALL_COURSES).await {
        return Ok(ApiResponse::ok("Courses found in cache", courses));
    }

    let courses = state
        .store
        .list_courses()
        .await
        .map_err(|e| ApiError::persistence("Error fetching courses", e))?;

    state
        .cache
        .set(keys::ALL_COURSES, &courses, state.cache.default_ttl())
        .await;

    Ok(ApiResponse::ok("Courses found successfully", courses))
}
