// handlers/public/auth/signin.rs - POST /api/v1/auth/signin handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::AuthPayload;
use crate::database::models::{SigninInput, UserSummary};
use crate::error::ApiError;
use crate::handlers::utils::body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::Validate;

/**
 * POST /api/v1/auth/signin - Exchange credentials for a token
 *
 * Unknown email and wrong password produce the same 401 so the response
 * does not reveal which accounts exist.
 */
pub async fn signin_post(
    State(state): State<AppState>,
    payload: Result<Json<SigninInput>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let credentials = body(payload)?.validate()?;

    let Some(user) = state
        .store
        .find_user_by_email(&credentials.email)
        .await
        .map_err(|e| ApiError::persistence("Error signing in", e))?
    else {
        debug!("Sign-in for unknown email");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    let hasher = Arc::clone(&state.passwords);
    let stored_hash = user.password_hash.clone();
    let password = credentials.password;
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&stored_hash, &password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            ApiError::internal_server_error("Error signing in")
        })??;

    if !matches {
        debug!(user_id = user.meta.id, "Sign-in with wrong password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(user.meta.id, user.role)?;
    info!(user_id = user.meta.id, "User signed in");

    Ok(ApiResponse::ok(
        "Login successful",
        AuthPayload {
            token,
            user: UserSummary::from(&user),
        },
    ))
}
