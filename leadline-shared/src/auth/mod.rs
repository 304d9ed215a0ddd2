/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing and strength validation
/// - [`session`]: HS256 session token issuing and validation
/// - [`reset_token`]: Single-use password-reset tokens (SHA-256 hashed)
/// - [`guard`]: Request guards gating admin pages and mutation handlers
///
/// # Example
///
/// ```no_run
/// use leadline_shared::auth::password::{hash_password, verify_password};
/// use leadline_shared::auth::session::{create_session_token, SessionClaims};
/// use leadline_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password1")?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// let claims = SessionClaims::new(Uuid::new_v4(), UserRole::Staff);
/// let token = create_session_token(&claims, "secret-key-of-32-bytes-minimum!!")?;
/// # Ok(())
/// # }
/// ```

pub mod guard;
pub mod password;
pub mod reset_token;
pub mod session;
