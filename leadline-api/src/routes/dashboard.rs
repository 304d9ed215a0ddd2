/// Admin dashboard pages
///
/// These sit behind the redirecting guards: an anonymous browser hitting
/// them lands on the login page instead of seeing a 401 body.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use leadline_shared::auth::guard::Session;
use leadline_shared::models::{
    analytics_event::AnalyticsEvent, audit_log::AuditLogEntry, lead::Lead,
};
use serde_json::{json, Value as JsonValue};

/// GET /admin
///
/// Landing summary for any authenticated role.
pub async fn overview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<JsonValue>> {
    let total_leads = Lead::count(&state.db).await?;
    let page_views_7d =
        AnalyticsEvent::count_since(&state.db, "page_view", Utc::now() - Duration::days(7))
            .await?;

    Ok(Json(json!({
        "user_id": session.user_id,
        "role": session.role,
        "total_leads": total_leads,
        "page_views_7d": page_views_7d,
    })))
}

/// GET /admin/audit-log (admin only)
pub async fn audit_log(State(state): State<AppState>) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let entries = AuditLogEntry::list_recent(&state.db, 100).await?;
    Ok(Json(entries))
}
