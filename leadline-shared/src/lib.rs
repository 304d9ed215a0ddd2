//! # Leadline Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the Leadline API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, session tokens, reset tokens, request guards
//! - `throttle`: In-memory login and submission throttles
//! - `mailer`: Transactional email collaborator
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod mailer;
pub mod models;
pub mod throttle;

/// Current version of the Leadline shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
