/// Session guard — resolves the caller's identity and gates admin routes
///
/// The guard reads the session token from the `leadline_session` cookie (or
/// an `Authorization: Bearer` header for non-browser clients), validates it,
/// and cross-checks the user row: soft-deleted accounts and accounts flagged
/// for forced logout never yield a valid session.
///
/// Two flavors exist for the two kinds of routes:
///
/// - **Page flavor** (`require_session`, `require_admin_session`): redirects
///   to the login entry point on failure; forced logout redirects with a
///   reason code; a non-admin hitting an admin-only page is sent to the
///   default admin landing page.
/// - **Action flavor** (`assert_session`, `assert_admin_session`): returns a
///   [`GuardError`] (401/403) instead of redirecting, for mutation handlers.
///
/// On success both flavors insert a [`Session`] into request extensions.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{validate_session_token, SessionTokenError};
use crate::models::user::{User, UserRole};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "leadline_session";

/// Login entry point used by the page-flavored guards
pub const LOGIN_PATH: &str = "/admin/login";

/// Default landing page for authenticated non-admin users
pub const ADMIN_HOME_PATH: &str = "/admin";

/// Resolved identity added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role read from the user row (not the token), so demotions apply
    /// without waiting for token expiry
    pub role: UserRole,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for the action-flavored guards
#[derive(Debug)]
pub enum GuardError {
    /// No session token, or the token is invalid or expired
    Unauthenticated,

    /// The account carries a forced-logout flag; the session is void
    ForcedLogout { reason: String },

    /// Session is valid but the role is insufficient
    Forbidden,

    /// User lookup failed
    DatabaseError(String),
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        match self {
            GuardError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required").into_response()
            }
            GuardError::ForcedLogout { .. } => {
                (StatusCode::UNAUTHORIZED, "Session has been revoked").into_response()
            }
            GuardError::Forbidden => {
                (StatusCode::FORBIDDEN, "Insufficient permissions").into_response()
            }
            GuardError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Session guard database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the session token from the cookie or Authorization header
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookie_header.split(';') {
            let pair = pair.trim();
            if let Some(value) = pair.strip_prefix(SESSION_COOKIE) {
                if let Some(token) = value.strip_prefix('=') {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Resolves the caller's session from request headers
///
/// Validates the token, loads the user row, and applies the forced-logout
/// and soft-delete checks. Shared by both guard flavors.
///
/// # Errors
///
/// - `Unauthenticated`: missing/invalid/expired token, or user soft-deleted
/// - `ForcedLogout`: account flagged after this session was issued
/// - `DatabaseError`: user lookup failed
pub async fn resolve_session(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<Session, GuardError> {
    let token = extract_session_token(headers).ok_or(GuardError::Unauthenticated)?;

    // Expired and malformed tokens are indistinguishable to the caller
    let claims = validate_session_token(&token, secret)
        .map_err(|_: SessionTokenError| GuardError::Unauthenticated)?;

    // find_by_id filters soft-deleted rows, so a deleted account falls
    // through to Unauthenticated here.
    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| GuardError::DatabaseError(e.to_string()))?
        .ok_or(GuardError::Unauthenticated)?;

    if let Some(forced_at) = user.force_logout_at {
        if claims.iat <= forced_at.timestamp() {
            return Err(GuardError::ForcedLogout {
                reason: user
                    .force_logout_reason
                    .unwrap_or_else(|| "revoked".to_string()),
            });
        }
    }

    Ok(Session {
        user_id: user.id,
        role: user.role,
    })
}

/// Builds the login redirect for a failed page-flavored guard
fn login_redirect(error: &GuardError) -> Response {
    match error {
        GuardError::ForcedLogout { reason } => {
            Redirect::to(&format!("{}?reason={}", LOGIN_PATH, reason)).into_response()
        }
        _ => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// Page guard: any authenticated role, redirect to login on failure
pub async fn require_session(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_session(&pool, &secret, req.headers()).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => login_redirect(&e),
    }
}

/// Page guard: admin role required
///
/// Unauthenticated callers go to the login page; authenticated non-admins
/// are redirected to the default admin landing page.
pub async fn require_admin_session(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_session(&pool, &secret, req.headers()).await {
        Ok(session) if session.is_admin() => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Ok(_) => Redirect::to(ADMIN_HOME_PATH).into_response(),
        Err(e) => login_redirect(&e),
    }
}

/// Action guard: any authenticated role, errors instead of redirecting
pub async fn assert_session(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, GuardError> {
    let session = resolve_session(&pool, &secret, req.headers()).await?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Action guard: admin role required, errors instead of redirecting
pub async fn assert_admin_session(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, GuardError> {
    let session = resolve_session(&pool, &secret, req.headers()).await?;
    if !session.is_admin() {
        return Err(GuardError::Forbidden);
    }
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; leadline_session=abc123; other=1"),
        );

        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-456"),
        );

        assert_eq!(extract_session_token(&headers), Some("tok-456".to_string()));
    }

    #[test]
    fn test_cookie_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("leadline_session=cookie-token"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );

        assert_eq!(
            extract_session_token(&headers),
            Some("cookie-token".to_string())
        );
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("leadline_session="),
        );
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn test_guard_error_status_codes() {
        let response = GuardError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = GuardError::ForcedLogout {
            reason: "password_reset".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = GuardError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_login_redirect_carries_reason() {
        let response = login_redirect(&GuardError::ForcedLogout {
            reason: "password_reset".to_string(),
        });
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login?reason=password_reset"
        );

        let response = login_redirect(&GuardError::Unauthenticated);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
    }
}
