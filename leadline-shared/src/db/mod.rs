/// Database access layer
///
/// - `pool`: PostgreSQL connection pool construction and health checks
/// - `migrations`: sqlx migration runner

pub mod migrations;
pub mod pool;
