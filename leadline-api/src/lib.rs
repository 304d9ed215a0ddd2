//! # Leadline API Server Library
//!
//! Backend for the Leadline marketing site and its admin dashboard: public
//! lead intake, session-gated lead management, and the password-reset flow.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `cache`: Process-local admin view cache
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: HTTP-level middleware (security headers)
//! - `routes`: API route handlers
//! - `telemetry`: Fire-and-forget audit and analytics writes

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;
