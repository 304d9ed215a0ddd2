/// Audit log model — best-effort record of administrative actions
///
/// Append-only telemetry, not authoritative business data: writes happen
/// fire-and-forget from the API layer and a lost row is tolerable. Nothing
/// here is ever updated or deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE audit_log (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     actor_id UUID,
///     action VARCHAR(100) NOT NULL,
///     entity_type VARCHAR(50) NOT NULL,
///     entity_id UUID,
///     detail JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// One audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// Who performed the action (no FK; actors may be deleted later)
    pub actor_id: Option<Uuid>,

    /// Action name, e.g. "lead.update_status"
    pub action: String,

    /// Entity type the action touched, e.g. "lead"
    pub entity_type: String,

    /// Entity ID the action touched
    pub entity_id: Option<Uuid>,

    /// Action-specific detail
    pub detail: JsonValue,

    /// When the action happened
    pub created_at: DateTime<Utc>,
}

/// Input for recording an audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAudit {
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub detail: JsonValue,
}

impl AuditLogEntry {
    /// Inserts an audit entry
    ///
    /// Callers must not let a failure here abort the primary operation;
    /// the API layer spawns this and logs-and-drops the error.
    pub async fn record(pool: &PgPool, data: RecordAudit) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO audit_log (actor_id, action, entity_type, entity_id, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, actor_id, action, entity_type, entity_id, detail, created_at
            "#,
        )
        .bind(data.actor_id)
        .bind(data.action)
        .bind(data.entity_type)
        .bind(data.entity_id)
        .bind(data.detail)
        .fetch_one(pool)
        .await
    }

    /// Lists recent entries, newest first
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, actor_id, action, entity_type, entity_id, detail, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
