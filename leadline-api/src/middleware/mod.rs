/// Middleware modules for the API server
///
/// Session guards live in `leadline_shared::auth::guard`; this module holds
/// the purely HTTP-level middleware.

pub mod security;
