// handlers/public/auth/mod.rs - Account creation and sign-in

use serde::Serialize;

use crate::database::models::UserSummary;

pub mod signin; // POST /api/v1/auth/signin
pub mod signup; // POST /api/v1/auth/signup

pub use signin::signin_post;
pub use signup::signup_post;

/// Returned by both endpoints. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserSummary,
}
