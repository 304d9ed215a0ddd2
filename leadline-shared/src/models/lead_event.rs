/// Lead event model — the append-only trail behind every lead
///
/// Each mutation of a lead (and every note) appends one row here. Rows are
/// never updated or deleted; reads are always in ascending creation order so
/// the trail replays the lead's history top to bottom.
///
/// A `StatusChangeRequested` event records a change the actor was not
/// permitted to apply directly. It does not mutate the lead; the dashboard
/// surfaces it as "Requested: X" until an admin applies the change through
/// the normal update path.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lead_events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     lead_id UUID NOT NULL REFERENCES leads(id) ON DELETE CASCADE,
///     actor_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     kind VARCHAR(50) NOT NULL,
///     old_value VARCHAR(255),
///     new_value VARCHAR(255),
///     note TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Event types recorded on a lead's trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadEventKind {
    /// Free-text note from a staff member
    NoteAdded,

    /// Status field written (old_value → new_value)
    StatusChanged,

    /// Status change recorded without mutating the field; awaits an admin
    StatusChangeRequested,

    /// Priority field written
    PriorityChanged,

    /// Assignee changed
    AssignmentChanged,

    /// Follow-up date set or cleared
    FollowUpChanged,
}

impl LeadEventKind {
    /// Converts kind to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadEventKind::NoteAdded => "note_added",
            LeadEventKind::StatusChanged => "status_changed",
            LeadEventKind::StatusChangeRequested => "status_change_requested",
            LeadEventKind::PriorityChanged => "priority_changed",
            LeadEventKind::AssignmentChanged => "assignment_changed",
            LeadEventKind::FollowUpChanged => "follow_up_changed",
        }
    }

    /// Parses kind from its storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "note_added" => Some(LeadEventKind::NoteAdded),
            "status_changed" => Some(LeadEventKind::StatusChanged),
            "status_change_requested" => Some(LeadEventKind::StatusChangeRequested),
            "priority_changed" => Some(LeadEventKind::PriorityChanged),
            "assignment_changed" => Some(LeadEventKind::AssignmentChanged),
            "follow_up_changed" => Some(LeadEventKind::FollowUpChanged),
            _ => None,
        }
    }
}

/// A single entry on a lead's trail
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeadEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Lead this event belongs to
    pub lead_id: Uuid,

    /// Who performed the action (None if the account was since hard-removed)
    pub actor_id: Option<Uuid>,

    /// Event type (see [`LeadEventKind`])
    pub kind: String,

    /// Previous field value, for change events
    pub old_value: Option<String>,

    /// New (or requested) field value, for change events
    pub new_value: Option<String>,

    /// Note text, for `note_added` events
    pub note: Option<String>,

    /// When the event was recorded
    pub created_at: DateTime<Utc>,
}

/// Input for appending an event
#[derive(Debug, Clone)]
pub struct AppendLeadEvent {
    pub lead_id: Uuid,
    pub actor_id: Uuid,
    pub kind: LeadEventKind,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub note: Option<String>,
}

impl LeadEvent {
    /// Appends an event to the lead's trail
    ///
    /// # Errors
    ///
    /// Returns an error if the lead does not exist (FK violation) or the
    /// database is unreachable.
    pub async fn append(pool: &PgPool, data: AppendLeadEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LeadEvent>(
            r#"
            INSERT INTO lead_events (lead_id, actor_id, kind, old_value, new_value, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, lead_id, actor_id, kind, old_value, new_value, note, created_at
            "#,
        )
        .bind(data.lead_id)
        .bind(data.actor_id)
        .bind(data.kind.as_str())
        .bind(data.old_value)
        .bind(data.new_value)
        .bind(data.note)
        .fetch_one(pool)
        .await
    }

    /// Lists a lead's trail in ascending creation order
    pub async fn list_for_lead(pool: &PgPool, lead_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, LeadEvent>(
            r#"
            SELECT id, lead_id, actor_id, kind, old_value, new_value, note, created_at
            FROM lead_events
            WHERE lead_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let kinds = [
            LeadEventKind::NoteAdded,
            LeadEventKind::StatusChanged,
            LeadEventKind::StatusChangeRequested,
            LeadEventKind::PriorityChanged,
            LeadEventKind::AssignmentChanged,
            LeadEventKind::FollowUpChanged,
        ];

        for kind in kinds {
            assert_eq!(LeadEventKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert_eq!(LeadEventKind::parse("deleted"), None);
        assert_eq!(LeadEventKind::parse(""), None);
    }
}
