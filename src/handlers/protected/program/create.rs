// handlers/protected/program/create.rs - POST /api/v1/programs handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;

use crate::auth::Identity;
use crate::database::models::{CreateProgramInput, Program};
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

pub async fn program_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateProgramInput>, JsonRejection>,
) -> ApiResult<Program> {
    let new_program = body(payload)?.validate()?;

    let program = state
        .store
        .create_program(&new_program)
        .await
        .map_err(|e| ApiError::persistence("Error creating program", e))?;

    info!(program_id = program.meta.id, user_id = identity.user_id, "Program created");
    Ok(ApiResponse::ok("Program created successfully", program))
}
