pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::Role;

pub use password::{HashingError, PasswordHasher};

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Authenticated caller attached to each protected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,

    #[error("bad token signature")]
    BadSignature,

    #[error("invalid token claims")]
    InvalidClaims,

    #[error("JWT generation error: {0}")]
    Signing(String),
}

/// Signs a token binding `user_id` and `role`, valid for `ttl`.
pub fn issue_token(user_id: i64, role: Role, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Signing("empty signing secret".to_string()));
    }

    let claims = Claims::new(user_id, role, ttl);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Checks signature and expiry and recovers the caller's identity.
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => AuthError::Malformed,
        })?;

    if data.claims.user_id <= 0 {
        return Err(AuthError::InvalidClaims);
    }

    Ok(Identity::from(data.claims))
}

/// Holds the shared secret and token lifetime for the running service.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        issue_token(user_id, role, &self.secret, self.ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        verify_token(token, &self.secret)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}
