/// User model and database operations
///
/// Staff and admin accounts for the admin dashboard. Accounts are never hard
/// deleted; `deleted_at` marks them inactive and every read path filters on
/// it. Password reset state (token hash + expiry) lives on the row so that
/// consuming a reset is a single atomic update.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'staff');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'staff',
///     password_hash VARCHAR(255) NOT NULL,
///     password_changed_at TIMESTAMPTZ,
///     reset_token_hash VARCHAR(64),
///     reset_token_expires_at TIMESTAMPTZ,
///     force_logout_at TIMESTAMPTZ,
///     force_logout_reason VARCHAR(100),
///     last_login_at TIMESTAMPTZ,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use leadline_shared::models::user::{User, CreateUser, UserRole};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "staff@example.com".to_string(),
///     name: "Pat Staff".to_string(),
///     role: UserRole::Staff,
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "staff@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access, including destructive operations and user management
    Admin,

    /// Day-to-day lead handling
    Staff,
}

impl UserRole {
    /// Converts role to string for logging and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

const USER_COLUMNS: &str = "id, email, name, role, password_hash, password_changed_at, \
     reset_token_hash, reset_token_expires_at, force_logout_at, force_logout_reason, \
     last_login_at, deleted_at, created_at, updated_at";

/// User model representing a dashboard account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address, unique across all accounts including soft-deleted ones
    pub email: String,

    /// Display name
    pub name: String,

    /// Dashboard role
    pub role: UserRole,

    /// Argon2id password hash, never plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the password was last changed (None if never changed)
    pub password_changed_at: Option<DateTime<Utc>>,

    /// SHA-256 hex hash of the pending reset token (None when no reset pending)
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,

    /// When the pending reset token expires
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    /// When a forced logout was requested (sessions issued before this are invalid)
    pub force_logout_at: Option<DateTime<Utc>>,

    /// Reason code surfaced to the user on forced logout
    pub force_logout_reason: Option<String>,

    /// When the user last logged in
    pub last_login_at: Option<DateTime<Utc>>,

    /// Soft-delete timestamp; a set value means the account is inactive
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Dashboard role
    pub role: UserRole,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,
}

impl User {
    /// Whether the account is active (not soft-deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether a password reset is currently pending on this account
    pub fn has_pending_reset(&self) -> bool {
        self.reset_token_hash.is_some() && self.reset_token_expires_at.is_some()
    }

    /// Creates a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.name)
        .bind(data.role)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active user by ID
    ///
    /// Soft-deleted accounts are never returned.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds an active user by email (lowercased before comparison)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Lists active users, newest first
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(pool)
        .await
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stores a pending password-reset token hash and its expiry
    ///
    /// Overwrites any previous pending reset; only one reset can be pending
    /// per account at a time.
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Applies a new password hash and clears the pending reset in one statement
    ///
    /// The `WHERE` clause re-checks the stored token hash so that two
    /// concurrent consume attempts cannot both succeed: the first update
    /// clears the hash, the second matches zero rows.
    ///
    /// # Returns
    ///
    /// True if the reset was consumed, false if no row matched (token already
    /// used or hash changed underneath us).
    pub async fn consume_reset_token(
        pool: &PgPool,
        id: Uuid,
        expected_token_hash: &str,
        new_password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3,
                password_changed_at = NOW(),
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND reset_token_hash = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(expected_token_hash)
        .bind(new_password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flags the account for forced logout with a reason code
    ///
    /// The session guard rejects sessions issued before `force_logout_at`
    /// and surfaces the reason on the login redirect.
    pub async fn set_force_logout(
        pool: &PgPool,
        id: Uuid,
        reason: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET force_logout_at = NOW(), force_logout_reason = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the forced-logout flag
    pub async fn clear_force_logout(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET force_logout_at = NULL, force_logout_reason = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes the account
    ///
    /// Deleting an already-deleted account is a no-op (returns false).
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            name: "Pat Staff".to_string(),
            role: UserRole::Staff,
            password_hash: "$argon2id$stub".to_string(),
            password_changed_at: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            force_logout_at: None,
            force_logout_reason: None,
            last_login_at: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_helpers() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Staff.is_admin());
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Staff.as_str(), "staff");
    }

    #[test]
    fn test_is_active_respects_soft_delete() {
        let mut user = sample_user();
        assert!(user.is_active());

        user.deleted_at = Some(Utc::now());
        assert!(!user.is_active());
    }

    #[test]
    fn test_pending_reset_requires_both_fields() {
        let mut user = sample_user();
        assert!(!user.has_pending_reset());

        user.reset_token_hash = Some("ab".repeat(32));
        assert!(!user.has_pending_reset());

        user.reset_token_expires_at = Some(Utc::now());
        assert!(user.has_pending_reset());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("reset_token_hash"));
    }
}
