// handlers/utils.rs - helpers shared by every handler

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;

/// Unwraps a JSON body, turning any rejection into a 400 envelope.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = payload?;
    Ok(value)
}

/// Parses a path id. Anything that is not a positive integer cannot name a
/// stored row, so it reports `not_found` like an unknown id would.
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::not_found(not_found))
}
