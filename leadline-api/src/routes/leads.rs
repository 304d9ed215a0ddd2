/// Lead management handlers for the admin dashboard
///
/// Every mutation appends one event to the lead's trail and invalidates the
/// cached list view. Status writes carry the one lifecycle rule: a terminal
/// lead (completed or lost) only changes status at an admin's hand; a staff
/// write against it is recorded as a request, leaving the field untouched.

use crate::{
    app::AppState,
    cache::LEAD_LIST_VIEW,
    error::{validation_error, ApiError, ApiResult},
    telemetry,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use leadline_shared::auth::guard::Session;
use leadline_shared::models::{
    lead::{Lead, LeadPriority, LeadStatus},
    lead_event::{AppendLeadEvent, LeadEvent, LeadEventKind},
    user::User,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

/// Default page size for the lead list
const DEFAULT_PAGE_SIZE: i64 = 50;

/// What a status write attempt should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusWrite {
    /// Requested status equals the current one; nothing happens
    Noop,

    /// Write the field and append a status-changed event
    Apply,

    /// Terminal lead, non-admin actor: record the request, leave the field
    RecordRequest,
}

/// Decides the outcome of a status write
///
/// The one lifecycle rule lives here: only an admin writes the status field
/// of a terminal lead; anyone else's attempt is recorded as a request.
fn plan_status_write(current: LeadStatus, requested: LeadStatus, actor_is_admin: bool) -> StatusWrite {
    if current == requested {
        return StatusWrite::Noop;
    }

    if current.is_terminal() && !actor_is_admin {
        return StatusWrite::RecordRequest;
    }

    StatusWrite::Apply
}

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: LeadStatus,
}

/// Status update response
///
/// `requested` is true when the write was recorded as a pending request
/// instead of being applied.
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub lead: Lead,
    pub requested: bool,
}

/// Priority update request
#[derive(Debug, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: LeadPriority,
}

/// Assignment update request
#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    /// Target assignee; null unassigns
    pub assigned_to: Option<Uuid>,
}

/// Follow-up update request
#[derive(Debug, Deserialize)]
pub struct UpdateFollowUpRequest {
    /// Follow-up date; null clears it
    pub follow_up_at: Option<DateTime<Utc>>,
}

/// Note request
#[derive(Debug, Deserialize, Validate)]
pub struct AddNoteRequest {
    #[validate(length(min = 1, max = 5000, message = "Note must be 1-5000 characters"))]
    pub note: String,
}

/// GET /admin/api/leads
///
/// The first page is served from the view cache when possible; mutations
/// invalidate it. Other pages always hit the database.
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<JsonValue>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);
    let is_default_page = limit == DEFAULT_PAGE_SIZE && offset == 0;

    if is_default_page {
        if let Some(cached) = state.view_cache.get(LEAD_LIST_VIEW) {
            return Ok(Json(cached));
        }
    }

    let leads = Lead::list(&state.db, limit, offset).await?;
    let total = Lead::count(&state.db).await?;

    let payload = json!({
        "leads": leads,
        "total": total,
        "limit": limit,
        "offset": offset,
    });

    if is_default_page {
        state.view_cache.put(LEAD_LIST_VIEW, payload.clone());
    }

    Ok(Json(payload))
}

/// GET /admin/api/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Lead>> {
    let lead = Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    Ok(Json(lead))
}

/// GET /admin/api/leads/:id/events
///
/// Returns the trail oldest-first.
pub async fn list_lead_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<LeadEvent>>> {
    // 404 for unknown or soft-deleted leads, even if orphaned events exist
    Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    let events = LeadEvent::list_for_lead(&state.db, id).await?;
    Ok(Json(events))
}

/// POST /admin/api/leads/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    let lead = Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    match plan_status_write(lead.status, body.status, session.is_admin()) {
        StatusWrite::Noop => {
            return Ok(Json(UpdateStatusResponse {
                lead,
                requested: false,
            }));
        }
        StatusWrite::RecordRequest => {}
        StatusWrite::Apply => {
            let old_status = lead.status;
            let updated = Lead::update_status(&state.db, id, body.status)
                .await?
                .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

            LeadEvent::append(
                &state.db,
                AppendLeadEvent {
                    lead_id: updated.id,
                    actor_id: session.user_id,
                    kind: LeadEventKind::StatusChanged,
                    old_value: Some(old_status.as_str().to_string()),
                    new_value: Some(updated.status.as_str().to_string()),
                    note: None,
                },
            )
            .await?;

            state.view_cache.invalidate(LEAD_LIST_VIEW);
            telemetry::record_audit(
                &state.db,
                Some(session.user_id),
                "lead.update_status",
                "lead",
                Some(updated.id),
                json!({ "from": old_status.as_str(), "to": updated.status.as_str() }),
            );

            return Ok(Json(UpdateStatusResponse {
                lead: updated,
                requested: false,
            }));
        }
    }

    // Record the intent without touching the field
    LeadEvent::append(
        &state.db,
        AppendLeadEvent {
            lead_id: lead.id,
            actor_id: session.user_id,
            kind: LeadEventKind::StatusChangeRequested,
            old_value: Some(lead.status.as_str().to_string()),
            new_value: Some(body.status.as_str().to_string()),
            note: None,
        },
    )
    .await?;

    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "lead.status_change_requested",
        "lead",
        Some(lead.id),
        json!({ "from": lead.status.as_str(), "to": body.status.as_str() }),
    );

    Ok(Json(UpdateStatusResponse {
        lead,
        requested: true,
    }))
}

/// POST /admin/api/leads/:id/priority
pub async fn update_priority(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePriorityRequest>,
) -> ApiResult<Json<Lead>> {
    let lead = Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    if lead.priority == body.priority {
        return Ok(Json(lead));
    }

    let old_priority = lead.priority;
    let updated = Lead::update_priority(&state.db, id, body.priority)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    LeadEvent::append(
        &state.db,
        AppendLeadEvent {
            lead_id: updated.id,
            actor_id: session.user_id,
            kind: LeadEventKind::PriorityChanged,
            old_value: Some(old_priority.as_str().to_string()),
            new_value: Some(updated.priority.as_str().to_string()),
            note: None,
        },
    )
    .await?;

    state.view_cache.invalidate(LEAD_LIST_VIEW);
    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "lead.update_priority",
        "lead",
        Some(updated.id),
        json!({ "from": old_priority.as_str(), "to": updated.priority.as_str() }),
    );

    Ok(Json(updated))
}

/// POST /admin/api/leads/:id/assignment
///
/// The assignee must be an active account at the time of the write; later
/// deactivation leaves the assignment in place.
pub async fn update_assignment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAssignmentRequest>,
) -> ApiResult<Json<Lead>> {
    let lead = Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    if let Some(assignee_id) = body.assigned_to {
        User::find_by_id(&state.db, assignee_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("Assignee not found or inactive".to_string()))?;
    }

    if lead.assigned_to == body.assigned_to {
        return Ok(Json(lead));
    }

    let old_assignee = lead.assigned_to;
    let updated = Lead::update_assignment(&state.db, id, body.assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    LeadEvent::append(
        &state.db,
        AppendLeadEvent {
            lead_id: updated.id,
            actor_id: session.user_id,
            kind: LeadEventKind::AssignmentChanged,
            old_value: old_assignee.map(|u| u.to_string()),
            new_value: updated.assigned_to.map(|u| u.to_string()),
            note: None,
        },
    )
    .await?;

    state.view_cache.invalidate(LEAD_LIST_VIEW);
    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "lead.update_assignment",
        "lead",
        Some(updated.id),
        json!({ "from": old_assignee, "to": updated.assigned_to }),
    );

    Ok(Json(updated))
}

/// POST /admin/api/leads/:id/follow-up
pub async fn update_follow_up(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFollowUpRequest>,
) -> ApiResult<Json<Lead>> {
    let lead = Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    if lead.follow_up_at == body.follow_up_at {
        return Ok(Json(lead));
    }

    let old_follow_up = lead.follow_up_at;
    let updated = Lead::update_follow_up(&state.db, id, body.follow_up_at)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    LeadEvent::append(
        &state.db,
        AppendLeadEvent {
            lead_id: updated.id,
            actor_id: session.user_id,
            kind: LeadEventKind::FollowUpChanged,
            old_value: old_follow_up.map(|t| t.to_rfc3339()),
            new_value: updated.follow_up_at.map(|t| t.to_rfc3339()),
            note: None,
        },
    )
    .await?;

    state.view_cache.invalidate(LEAD_LIST_VIEW);
    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "lead.update_follow_up",
        "lead",
        Some(updated.id),
        json!({ "from": old_follow_up, "to": updated.follow_up_at }),
    );

    Ok(Json(updated))
}

/// POST /admin/api/leads/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddNoteRequest>,
) -> ApiResult<(StatusCode, Json<LeadEvent>)> {
    body.validate().map_err(validation_error)?;

    Lead::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    let event = LeadEvent::append(
        &state.db,
        AppendLeadEvent {
            lead_id: id,
            actor_id: session.user_id,
            kind: LeadEventKind::NoteAdded,
            old_value: None,
            new_value: None,
            note: Some(body.note),
        },
    )
    .await?;

    telemetry::record_audit(
        &state.db,
        Some(session.user_id),
        "lead.add_note",
        "lead",
        Some(id),
        json!({}),
    );

    Ok((StatusCode::CREATED, Json(event)))
}

/// DELETE /admin/api/leads/:id (admin only)
///
/// Soft delete. Deleting an already-deleted lead is a silent no-op, so
/// repeated clicks on a stale dashboard never surface an error.
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !session.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins can delete leads".to_string(),
        ));
    }

    let deleted = Lead::soft_delete(&state.db, id).await?;

    if deleted {
        state.view_cache.invalidate(LEAD_LIST_VIEW);
        telemetry::record_audit(
            &state.db,
            Some(session.user_id),
            "lead.delete",
            "lead",
            Some(id),
            json!({}),
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_write_on_terminal_lead_is_recorded_not_applied() {
        // A lead moved to LOST stays LOST under staff hands; the attempt
        // becomes a request event instead of a field write.
        assert_eq!(
            plan_status_write(LeadStatus::Lost, LeadStatus::Contacted, false),
            StatusWrite::RecordRequest
        );
        assert_eq!(
            plan_status_write(LeadStatus::Completed, LeadStatus::Quoted, false),
            StatusWrite::RecordRequest
        );
    }

    #[test]
    fn test_admin_writes_terminal_lead_directly() {
        assert_eq!(
            plan_status_write(LeadStatus::Lost, LeadStatus::Contacted, true),
            StatusWrite::Apply
        );
    }

    #[test]
    fn test_staff_writes_non_terminal_lead_directly() {
        assert_eq!(
            plan_status_write(LeadStatus::New, LeadStatus::Contacted, false),
            StatusWrite::Apply
        );
        assert_eq!(
            plan_status_write(LeadStatus::Quoted, LeadStatus::Lost, false),
            StatusWrite::Apply
        );
    }

    #[test]
    fn test_same_status_is_noop_for_everyone() {
        assert_eq!(
            plan_status_write(LeadStatus::Lost, LeadStatus::Lost, false),
            StatusWrite::Noop
        );
        assert_eq!(
            plan_status_write(LeadStatus::New, LeadStatus::New, true),
            StatusWrite::Noop
        );
    }
}
