/// Database models for Leadline
///
/// Each model is a plain struct with static async CRUD methods over a
/// `PgPool`. The core never issues raw queries outside these modules.
///
/// # Models
///
/// - `user`: Dashboard accounts with roles, reset state, and soft delete
/// - `lead`: Customer inquiries with status/priority/assignment lifecycle
/// - `lead_event`: Append-only per-lead change and note trail
/// - `audit_log`: Best-effort record of administrative actions
/// - `analytics_event`: Best-effort page-view and engagement beacons

pub mod analytics_event;
pub mod audit_log;
pub mod lead;
pub mod lead_event;
pub mod user;
