use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::{AuthError, Identity};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Roles allowed to create, change or remove catalog entries.
pub const CATALOG_EDITORS: &[Role] = &[Role::Admin, Role::Mentor];

/// Verifies the bearer token and attaches the caller's [`Identity`] to the
/// request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = bearer_token(request.headers())
        .and_then(|token| state.tokens.verify(token))
        .map_err(|e| {
            debug!(error = %e, path = %request.uri().path(), "Rejected credentials");
            ApiError::from(e)
        })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Runs after [`authenticate`]; rejects callers outside [`CATALOG_EDITORS`].
pub async fn require_catalog_editor(request: Request, next: Next) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("User role not found"))?;

    require_role(&identity, CATALOG_EDITORS)?;
    Ok(next.run(request).await)
}

pub fn require_role(identity: &Identity, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&identity.role) {
        return Ok(());
    }
    warn!(
        user_id = identity.user_id,
        role = identity.role.as_str(),
        "Insufficient permissions"
    );
    Err(ApiError::forbidden("Insufficient permissions"))
}

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = header.to_str().map_err(|_| AuthError::Malformed)?;
    if value.trim().is_empty() {
        return Err(AuthError::MissingHeader);
    }

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn missing_or_blank_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::MissingHeader));
        assert_eq!(bearer_token(&headers("")), Err(AuthError::MissingHeader));
    }

    #[test]
    fn wrong_scheme_is_malformed() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), Err(AuthError::Malformed));
        assert_eq!(bearer_token(&headers("Bearer ")), Err(AuthError::Malformed));
    }

    #[test]
    fn editors_are_admins_and_mentors() {
        let student = Identity { user_id: 1, role: Role::Student };
        let mentor = Identity { user_id: 2, role: Role::Mentor };
        let admin = Identity { user_id: 3, role: Role::Admin };
        assert!(require_role(&student, CATALOG_EDITORS).is_err());
        assert!(require_role(&mentor, CATALOG_EDITORS).is_ok());
        assert!(require_role(&admin, CATALOG_EDITORS).is_ok());
    }
}
