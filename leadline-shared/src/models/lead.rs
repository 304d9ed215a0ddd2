/// Lead model and database operations
///
/// A lead is a prospective-customer inquiry tracked through a status,
/// priority, and assignment lifecycle. Status, priority, assignment, and
/// follow-up date are independently settable single-field writes; the only
/// lifecycle rule is that LOST and COMPLETED are terminal.
///
/// # Status lifecycle
///
/// ```text
/// new → contacted → quoted → completed
/// any non-terminal → lost
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE lead_status AS ENUM ('new', 'contacted', 'quoted', 'completed', 'lost');
/// CREATE TYPE lead_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE leads (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255),
///     phone VARCHAR(50),
///     message TEXT,
///     inquiry_type VARCHAR(100) NOT NULL,
///     preferred_contact VARCHAR(20) NOT NULL DEFAULT 'email',
///     status lead_status NOT NULL DEFAULT 'new',
///     priority lead_priority NOT NULL DEFAULT 'medium',
///     source VARCHAR(100) NOT NULL DEFAULT 'website',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     follow_up_at TIMESTAMPTZ,
///     deleted_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Lead lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// Fresh inquiry, nobody has reached out yet
    New,

    /// A staff member has made contact
    Contacted,

    /// A quote has been sent
    Quoted,

    /// Work done, lead converted
    Completed,

    /// Lead went cold or declined
    Lost,
}

impl LeadStatus {
    /// Converts status to string for event payloads and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Quoted => "quoted",
            LeadStatus::Completed => "completed",
            LeadStatus::Lost => "lost",
        }
    }

    /// Terminal statuses accept no further staff status edits
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Lost)
    }
}

/// Lead priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

impl LeadPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadPriority::Low => "low",
            LeadPriority::Medium => "medium",
            LeadPriority::High => "high",
        }
    }
}

const LEAD_COLUMNS: &str = "id, name, email, phone, message, inquiry_type, preferred_contact, \
     status, priority, source, assigned_to, follow_up_at, deleted_at, created_at, updated_at";

/// Lead model representing a customer inquiry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    /// Unique lead ID
    pub id: Uuid,

    /// Contact name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Free-text inquiry message
    pub message: Option<String>,

    /// What the inquiry is about (e.g., "quote", "service", "general")
    pub inquiry_type: String,

    /// How the customer prefers to be reached ("email" or "phone")
    pub preferred_contact: String,

    /// Current lifecycle status
    pub status: LeadStatus,

    /// Current priority
    pub priority: LeadPriority,

    /// Where the lead came from (e.g., "website", "referral")
    pub source: String,

    /// Staff member handling the lead, if assigned
    pub assigned_to: Option<Uuid>,

    /// Scheduled follow-up date, if any
    pub follow_up_at: Option<DateTime<Utc>>,

    /// Soft-delete timestamp
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the inquiry arrived
    pub created_at: DateTime<Utc>,

    /// When the lead was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new lead
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLead {
    /// Contact name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Free-text inquiry message
    pub message: Option<String>,

    /// Inquiry type
    pub inquiry_type: String,

    /// Preferred contact method
    pub preferred_contact: String,

    /// Lead source
    pub source: String,
}

impl Lead {
    /// Creates a new lead in `new` status with `medium` priority
    pub async fn create(pool: &PgPool, data: CreateLead) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            INSERT INTO leads (name, email, phone, message, inquiry_type, preferred_contact, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.message)
        .bind(data.inquiry_type)
        .bind(data.preferred_contact)
        .bind(data.source)
        .fetch_one(pool)
        .await
    }

    /// Finds a lead by ID; soft-deleted leads are never returned
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists active leads with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts active leads
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM leads WHERE deleted_at IS NULL")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Writes a new status
    ///
    /// The caller is responsible for permission checks and for appending the
    /// matching status-change event.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Writes a new priority
    pub async fn update_priority(
        pool: &PgPool,
        id: Uuid,
        priority: LeadPriority,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET priority = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(priority)
        .fetch_optional(pool)
        .await
    }

    /// Assigns or unassigns the lead
    pub async fn update_assignment(
        pool: &PgPool,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(assigned_to)
        .fetch_optional(pool)
        .await
    }

    /// Sets or clears the follow-up date
    pub async fn update_follow_up(
        pool: &PgPool,
        id: Uuid,
        follow_up_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET follow_up_at = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {LEAD_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(follow_up_at)
        .fetch_optional(pool)
        .await
    }

    /// Soft-deletes the lead
    ///
    /// Deleting an already-deleted lead matches zero rows and returns false,
    /// which callers treat as a silent no-op.
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE leads SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(LeadStatus::Completed.is_terminal());
        assert!(LeadStatus::Lost.is_terminal());
        assert!(!LeadStatus::New.is_terminal());
        assert!(!LeadStatus::Contacted.is_terminal());
        assert!(!LeadStatus::Quoted.is_terminal());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(LeadStatus::New.as_str(), "new");
        assert_eq!(LeadStatus::Lost.as_str(), "lost");
        assert_eq!(LeadPriority::High.as_str(), "high");
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&LeadStatus::Contacted).unwrap();
        assert_eq!(json, "\"contacted\"");

        let status: LeadStatus = serde_json::from_str("\"quoted\"").unwrap();
        assert_eq!(status, LeadStatus::Quoted);
    }
}
