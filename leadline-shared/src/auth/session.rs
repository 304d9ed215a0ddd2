/// Session token issuing and validation
///
/// Sessions are HS256-signed JWTs carrying the user id and role. The guard
/// layer (see [`crate::auth::guard`]) validates the token on every request
/// and cross-checks the user row for soft delete and forced logout; the
/// token itself is deliberately thin.
///
/// # Example
///
/// ```
/// use leadline_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use leadline_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = SessionClaims::new(Uuid::new_v4(), UserRole::Staff);
/// let token = create_session_token(&claims, "a-secret-of-at-least-32-bytes!!!")?;
///
/// let validated = validate_session_token(&token, "a-secret-of-at-least-32-bytes!!!")?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// How long a session stays valid after login
pub const SESSION_TTL_HOURS: i64 = 12;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    /// Failed to sign the token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token signature or structure is invalid
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Session token has expired")]
    Expired,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: Uuid,

    /// Dashboard role at the time of login
    pub role: UserRole,

    /// Issued-at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// Creates claims for a fresh session expiring in [`SESSION_TTL_HOURS`]
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        }
    }
}

/// Signs a session token
///
/// # Errors
///
/// Returns `SessionTokenError::CreateError` if signing fails.
pub fn create_session_token(
    claims: &SessionClaims,
    secret: &str,
) -> Result<String, SessionTokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionTokenError::CreateError(e.to_string()))
}

/// Validates a session token and returns its claims
///
/// Checks the signature and expiration. Account-level checks (soft delete,
/// forced logout) are the guard's job.
///
/// # Errors
///
/// - `SessionTokenError::Expired` if `exp` has passed
/// - `SessionTokenError::Invalid` for any other validation failure
pub fn validate_session_token(
    token: &str,
    secret: &str,
) -> Result<SessionClaims, SessionTokenError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionTokenError::Expired,
        _ => SessionTokenError::Invalid(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate() {
        let user_id = Uuid::new_v4();
        let claims = SessionClaims::new(user_id, UserRole::Admin);
        let token = create_session_token(&claims, SECRET).unwrap();

        let validated = validate_session_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.role, UserRole::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = SessionClaims::new(Uuid::new_v4(), UserRole::Staff);
        let token = create_session_token(&claims, SECRET).unwrap();

        let result = validate_session_token(&token, "another-secret-also-32-bytes-long!!");
        assert!(matches!(result, Err(SessionTokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            role: UserRole::Staff,
            iat: (now - Duration::hours(13)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = create_session_token(&claims, SECRET).unwrap();

        let result = validate_session_token(&token, SECRET);
        assert!(matches!(result, Err(SessionTokenError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_session_token("not.a.token", SECRET);
        assert!(matches!(result, Err(SessionTokenError::Invalid(_))));
    }

    #[test]
    fn test_ttl_applied() {
        let claims = SessionClaims::new(Uuid::new_v4(), UserRole::Staff);
        let ttl = claims.exp - claims.iat;
        assert_eq!(ttl, SESSION_TTL_HOURS * 3600);
    }
}
