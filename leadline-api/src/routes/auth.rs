/// Authentication endpoints: login, logout, and the password-reset flow
///
/// Login failures are throttled per client key. The forgot/reset pair is
/// enumeration-safe end to end: forgot-password answers identically whether
/// or not the account exists, and reset-password collapses every failure
/// cause into one generic error.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    routes::client_key,
    telemetry,
};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use leadline_shared::auth::{
    guard::SESSION_COOKIE,
    password::{hash_password, validate_password_strength, verify_password},
    reset_token::{generate_reset_token, hash_reset_token, reset_token_ttl},
    session::{create_session_token, SessionClaims, SESSION_TTL_HOURS},
};
use leadline_shared::models::user::{User, UserRole};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use uuid::Uuid;
use validator::Validate;

/// Seconds a blocked client is told to wait before retrying login
const LOGIN_RETRY_AFTER_SECONDS: u64 = 15 * 60;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Authenticated user as returned to the dashboard
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (also set as an HttpOnly cookie)
    pub token: String,

    /// The authenticated user
    pub user: SessionUser,
}

/// Forgot-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Raw reset token from the emailed link
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    /// Replacement password
    #[validate(length(min = 1, message = "Password is required"))]
    pub new_password: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Whether a pending reset is still inside its validity window
///
/// `None` means no reset is pending; an elapsed expiry means the pending
/// reset is dead even if the stored hash would match.
fn reset_window_open(expires_at: Option<chrono::DateTime<Utc>>, now: chrono::DateTime<Utc>) -> bool {
    matches!(expires_at, Some(expires_at) if expires_at > now)
}

fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Response> {
    body.validate().map_err(validation_error)?;

    let key = client_key(&headers, peer);

    if state.login_throttle.is_blocked(&key) {
        return Err(ApiError::RateLimited {
            retry_after: LOGIN_RETRY_AFTER_SECONDS,
        });
    }

    // One failure path: wrong email and wrong password are indistinguishable
    let candidate = User::find_by_email(&state.db, &body.email).await?;
    let verified = match &candidate {
        Some(user) => verify_password(&body.password, &user.password_hash)?,
        None => false,
    };

    let user = match candidate {
        Some(user) if verified => user,
        _ => {
            state.login_throttle.register_failed_login(&key);
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
    };

    state.login_throttle.clear_failed_logins(&key);
    User::update_last_login(&state.db, user.id).await?;

    let claims = SessionClaims::new(user.id, user.role);
    let token = create_session_token(&claims, state.session_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");
    telemetry::record_audit(
        &state.db,
        Some(user.id),
        "auth.login",
        "user",
        Some(user.id),
        json!({}),
    );

    let secure = state.config.api.site_base_url.starts_with("https://");
    let cookie = session_cookie(&token, SESSION_TTL_HOURS * 3600, secure);

    let body = Json(LoginResponse {
        token,
        user: SessionUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
    });

    let mut response = (StatusCode::OK, body).into_response();
    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// POST /auth/logout
///
/// Stateless sessions cannot be revoked individually; logout clears the
/// cookie and the token simply ages out. Account-wide revocation goes
/// through the forced-logout flag instead.
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let secure = state.config.api.site_base_url.starts_with("https://");
    let cookie = session_cookie("", 0, secure);

    let body = Json(MessageResponse {
        message: "Logged out".to_string(),
    });

    let mut response = (StatusCode::OK, body).into_response();
    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// POST /auth/forgot-password
///
/// Always answers with the same message and status. Account lookup, token
/// issuance, and mail delivery happen behind that uniform response; their
/// failures are logged, never surfaced.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    body.validate().map_err(validation_error)?;

    if let Some(user) = User::find_by_email(&state.db, &body.email).await? {
        let (token, token_hash) = generate_reset_token();
        let expires_at = Utc::now() + reset_token_ttl();

        // Overwrites any earlier pending reset for this account
        User::set_reset_token(&state.db, user.id, &token_hash, expires_at).await?;

        let reset_url = state.config.reset_url(&user.email, &token);
        if let Err(e) = state
            .mailer
            .send_password_reset(&user.email, &user.name, &reset_url)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Reset email delivery failed");
        }

        telemetry::record_audit(
            &state.db,
            None,
            "auth.reset_requested",
            "user",
            Some(user.id),
            json!({}),
        );
    }

    Ok(Json(MessageResponse {
        message: "If that account exists, a reset link has been sent.".to_string(),
    }))
}

/// POST /auth/reset-password
///
/// Consuming the token is a single conditional update keyed on the stored
/// token hash, so two concurrent attempts with the same link cannot both
/// succeed. Success voids every session issued before the reset.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    body.validate().map_err(validation_error)?;

    validate_password_strength(&body.new_password).map_err(ApiError::BadRequest)?;

    let user = User::find_by_email(&state.db, &body.email)
        .await?
        .ok_or(ApiError::InvalidOrExpiredToken)?;

    if !reset_window_open(user.reset_token_expires_at, Utc::now()) {
        return Err(ApiError::InvalidOrExpiredToken);
    }

    let expected_hash = hash_reset_token(&body.token);
    let new_password_hash = hash_password(&body.new_password)?;

    let consumed =
        User::consume_reset_token(&state.db, user.id, &expected_hash, &new_password_hash).await?;

    if !consumed {
        return Err(ApiError::InvalidOrExpiredToken);
    }

    // Sessions issued before this moment are void
    User::set_force_logout(&state.db, user.id, "password_reset").await?;

    tracing::info!(user_id = %user.id, "Password reset completed");
    telemetry::record_audit(
        &state.db,
        Some(user.id),
        "auth.reset_completed",
        "user",
        Some(user.id),
        json!({}),
    );

    Ok(Json(MessageResponse {
        message: "Password updated. Please log in with your new password.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", 43200, false);
        assert!(cookie.starts_with("leadline_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=43200"));
        assert!(!cookie.contains("Secure"));

        let cookie = session_cookie("tok", 43200, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_logout_cookie_expires_immediately() {
        let cookie = session_cookie("", 0, false);
        assert!(cookie.starts_with("leadline_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_reset_window() {
        let now = Utc::now();

        assert!(!reset_window_open(None, now));
        assert!(!reset_window_open(Some(now - chrono::Duration::seconds(1)), now));
        assert!(reset_window_open(
            Some(now + chrono::Duration::minutes(5)),
            now
        ));

        // An expired window stays closed even though a hash would match
        assert!(!reset_window_open(
            Some(now - chrono::Duration::minutes(31)),
            now
        ));
    }
}
