/// User account management (admin only)
///
/// All routes here sit behind the admin guard. Accounts are soft-deleted,
/// never removed, so historical lead events keep their actors.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    telemetry,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use leadline_shared::auth::guard::Session;
use leadline_shared::auth::password::{hash_password, validate_password_strength};
use leadline_shared::models::user::{CreateUser, User, UserRole};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Create-user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub role: UserRole,

    /// Initial plaintext password, hashed before storage
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Force-logout request
#[derive(Debug, Deserialize)]
pub struct ForceLogoutRequest {
    /// Reason code shown on the login page, defaults to "revoked"
    pub reason: Option<String>,
}

/// POST /admin/api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    body.validate().map_err(validation_error)?;
    validate_password_strength(&body.password).map_err(ApiError::BadRequest)?;

    let password_hash = hash_password(&body.password)?;

    // Duplicate email surfaces as 409 via the unique constraint
    let user = User::create(
        &state.db,
        CreateUser {
            email: body.email.to_lowercase(),
            name: body.name,
            role: body.role,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User account created");
    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "user.create",
        "user",
        Some(user.id),
        json!({ "role": user.role.as_str() }),
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /admin/api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::list_active(&state.db).await?;
    Ok(Json(users))
}

/// DELETE /admin/api/users/:id
///
/// Soft delete; active sessions die on the next request because the guard
/// no longer finds the row. Self-deletion is refused.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if session.user_id == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::soft_delete(&state.db, id).await?;

    if deleted {
        telemetry::record_audit(
            &state.db,
            Some(session.user_id),
            "user.delete",
            "user",
            Some(id),
            json!({}),
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/api/users/:id/force-logout
///
/// Voids every session issued before the flag was set. A fresh login still
/// works (its tokens postdate the flag); locking the account out entirely
/// is the soft-delete path.
pub async fn force_logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<ForceLogoutRequest>,
) -> ApiResult<StatusCode> {
    let reason = body.reason.unwrap_or_else(|| "revoked".to_string());

    let updated = User::set_force_logout(&state.db, id, &reason).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, reason = %reason, "Forced logout applied");
    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "user.force_logout",
        "user",
        Some(id),
        json!({ "reason": reason }),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /admin/api/users/:id/force-logout
pub async fn clear_force_logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let updated = User::clear_force_logout(&state.db, id).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "user.clear_force_logout",
        "user",
        Some(id),
        json!({}),
    );

    Ok(StatusCode::NO_CONTENT)
}
