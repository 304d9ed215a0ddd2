/// Best-effort audit and analytics recording
///
/// Every mutating handler calls [`record_audit`]; the write happens on a
/// spawned task and its error, if any, is logged and discarded. Telemetry
/// must never block or fail the primary operation — that is the whole
/// contract of this module.

use leadline_shared::models::{
    analytics_event::{AnalyticsEvent, RecordAnalyticsEvent},
    audit_log::{AuditLogEntry, RecordAudit},
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Records an administrative action, fire-and-forget
pub fn record_audit(
    pool: &PgPool,
    actor_id: Option<Uuid>,
    action: &str,
    entity_type: &str,
    entity_id: Option<Uuid>,
    detail: JsonValue,
) {
    let pool = pool.clone();
    let entry = RecordAudit {
        actor_id,
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id,
        detail,
    };

    tokio::spawn(async move {
        if let Err(e) = AuditLogEntry::record(&pool, entry).await {
            tracing::warn!(error = %e, "Audit write failed (dropped)");
        }
    });
}

/// Records an analytics event, fire-and-forget
pub fn record_analytics(pool: &PgPool, event: RecordAnalyticsEvent) {
    let pool = pool.clone();

    tokio::spawn(async move {
        if let Err(e) = AnalyticsEvent::record(&pool, event).await {
            tracing::warn!(error = %e, "Analytics write failed (dropped)");
        }
    });
}
