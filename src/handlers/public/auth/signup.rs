// handlers/public/auth/signup.rs - POST /api/v1/auth/signup handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use super::AuthPayload;
use crate::database::models::{NewUser, SignupInput, UserSummary};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/**
 * POST /api/v1/auth/signup - Register an account and receive a token
 *
 * Input: `{email, password, full_name, role}` where role is one of
 * admin, student or mentor. Output data: `{token, user}`.
 */
pub async fn signup_post(
    State(state): State<AppState>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let signup = body(payload)?.validate()?;

    let existing = state
        .store
        .find_user_by_email(&signup.email)
        .await
        .map_err(|e| ApiError::persistence("Error creating user", e))?;
    if existing.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let hasher = Arc::clone(&state.passwords);
    let password = signup.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            ApiError::internal_server_error("Error creating user")
        })?
        .map_err(|e| {
            error!(error = %e, "Password hashing failed");
            ApiError::internal_server_error("Error creating user")
        })?;

    let user = state
        .store
        .create_user(&NewUser {
            email: signup.email,
            password_hash,
            full_name: signup.full_name,
            role: signup.role,
        })
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::bad_request("Email already registered"),
            other => ApiError::persistence("Error creating user", other),
        })?;

    let token = state.tokens.issue(user.meta.id, user.role)?;
    info!(user_id = user.meta.id, role = user.role.as_str(), "User registered");

    Ok(ApiResponse::ok(
        "User created successfully",
        AuthPayload {
            token,
            user: UserSummary::from(&user),
        },
    ))
}
