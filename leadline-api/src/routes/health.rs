/// Health check endpoint

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,

    /// Database connectivity
    pub database: String,

    /// Crate version
    pub version: String,
}

/// GET /health
///
/// Returns 200 with component statuses; reports "degraded" when the
/// database ping fails rather than erroring out.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match leadline_shared::db::pool::health_check(&state.db).await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "unavailable".to_string()
        }
    };

    let status = if database == "ok" { "ok" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        database,
        version: leadline_shared::VERSION.to_string(),
    }))
}
