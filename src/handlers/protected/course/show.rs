// handlers/protected/course/show.rs - GET /api/v1/courses/:id handler

use axum::extract::{Path, State};

use super::NOT_FOUND;
use crate::cache::keys;
use crate::database::models::Course;
use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn course_show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Course> {
    let id = parse_id(&id, NOT_FOUND)?;
    let store = &state.store;

    let lookup = state
        .cache
        .get_or_load(&keys::course(id), state.cache.default_ttl(), move || async move {
            store
                .find_course(id)
                .await
                .map_err(|e| ApiError::persistence("Error fetching course", e))?
                .ok_or_else(|| ApiError::not_found(NOT_FOUND))
        })
        .await?;

    let message = if lookup.from_cache {
        "Course found in cache"
    } else {
        "Course found successfully"
    };
    Ok(ApiResponse::ok(message, lookup.value))
}
