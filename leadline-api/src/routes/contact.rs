/// Public contact form — the lead intake endpoint
///
/// Anonymous, throttled per client key: one accepted submission every thirty
/// seconds. The throttle gate runs after validation, since checking it
/// records the acceptance; a submission rejected for bad input must not
/// consume the window.

use crate::{
    app::AppState,
    cache::LEAD_LIST_VIEW,
    error::{validation_error, ApiError, ApiResult},
    routes::client_key,
    telemetry,
};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use leadline_shared::models::{
    analytics_event::RecordAnalyticsEvent,
    lead::{CreateLead, Lead},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use uuid::Uuid;
use validator::Validate;

/// Seconds a throttled client is told to wait
const RETRY_AFTER_SECONDS: u64 = 30;

/// Contact form submission
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitContactRequest {
    /// Contact name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Contact phone number
    #[validate(length(max = 50, message = "Phone number too long"))]
    pub phone: Option<String>,

    /// Free-text message
    #[validate(length(max = 5000, message = "Message too long"))]
    pub message: Option<String>,

    /// What the inquiry is about
    #[validate(length(min = 1, max = 100, message = "Inquiry type is required"))]
    pub inquiry_type: String,

    /// "email" or "phone"
    pub preferred_contact: Option<String>,
}

/// Response after a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitContactResponse {
    /// Reference ID of the created lead
    pub id: Uuid,

    /// Confirmation message for the visitor
    pub message: String,
}

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<SubmitContactRequest>,
) -> ApiResult<(StatusCode, Json<SubmitContactResponse>)> {
    body.validate().map_err(validation_error)?;

    let preferred_contact = match body.preferred_contact.as_deref() {
        None | Some("email") => "email".to_string(),
        Some("phone") => "phone".to_string(),
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown preferred contact method: {}",
                other
            )))
        }
    };

    // A lead must be reachable one way or the other
    if body.email.is_none() && body.phone.is_none() {
        return Err(ApiError::BadRequest(
            "Either an email address or a phone number is required".to_string(),
        ));
    }

    // Last gate: `can_submit` records the acceptance, so the input must
    // already be known good when we ask.
    let key = client_key(&headers, peer);
    if !state.submission_throttle.can_submit(&key) {
        return Err(ApiError::RateLimited {
            retry_after: RETRY_AFTER_SECONDS,
        });
    }

    let lead = Lead::create(
        &state.db,
        CreateLead {
            name: body.name,
            email: body.email,
            phone: body.phone,
            message: body.message,
            inquiry_type: body.inquiry_type,
            preferred_contact,
            source: "website".to_string(),
        },
    )
    .await?;

    tracing::info!(lead_id = %lead.id, inquiry_type = %lead.inquiry_type, "New lead received");

    state.view_cache.invalidate(LEAD_LIST_VIEW);
    telemetry::record_analytics(
        &state.db,
        RecordAnalyticsEvent {
            kind: "contact_submitted".to_string(),
            path: Some("/contact".to_string()),
            visitor_key: None,
            metadata: json!({ "inquiry_type": lead.inquiry_type }),
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitContactResponse {
            id: lead.id,
            message: "Thanks for reaching out. We'll get back to you shortly.".to_string(),
        }),
    ))
}
