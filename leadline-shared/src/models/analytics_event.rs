/// Analytics event model — page-view and engagement beacons
///
/// Best-effort, loss-tolerant telemetry from the public site. Same contract
/// as the audit log: append-only, written fire-and-forget, never blocking a
/// primary operation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE analytics_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     kind VARCHAR(50) NOT NULL,
///     path VARCHAR(512),
///     visitor_key VARCHAR(128),
///     metadata JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// One analytics event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnalyticsEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Event kind, e.g. "page_view", "engagement"
    pub kind: String,

    /// Page path the event occurred on
    pub path: Option<String>,

    /// Opaque visitor identifier (no PII)
    pub visitor_key: Option<String>,

    /// Event-specific metadata
    pub metadata: JsonValue,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for recording an analytics event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAnalyticsEvent {
    pub kind: String,
    pub path: Option<String>,
    pub visitor_key: Option<String>,
    pub metadata: JsonValue,
}

impl AnalyticsEvent {
    /// Inserts an analytics event
    pub async fn record(
        pool: &PgPool,
        data: RecordAnalyticsEvent,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AnalyticsEvent>(
            r#"
            INSERT INTO analytics_events (kind, path, visitor_key, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id, kind, path, visitor_key, metadata, created_at
            "#,
        )
        .bind(data.kind)
        .bind(data.path)
        .bind(data.visitor_key)
        .bind(data.metadata)
        .fetch_one(pool)
        .await
    }

    /// Counts events of a kind since a given time
    pub async fn count_since(
        pool: &PgPool,
        kind: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM analytics_events WHERE kind = $1 AND created_at >= $2",
        )
        .bind(kind)
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
