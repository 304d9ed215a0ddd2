/// Public analytics beacon
///
/// Accepts page-view and engagement events from the site. The write is
/// fire-and-forget: the endpoint always answers 202 once the payload parses,
/// and a dropped row is acceptable by contract.

use crate::{app::AppState, error::{validation_error, ApiResult}, telemetry};
use axum::{extract::State, http::StatusCode, Json};
use leadline_shared::models::analytics_event::RecordAnalyticsEvent;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

/// Analytics beacon payload
#[derive(Debug, Deserialize, Validate)]
pub struct RecordEventRequest {
    /// Event kind, e.g. "page_view"
    #[validate(length(min = 1, max = 50, message = "Event kind is required"))]
    pub kind: String,

    /// Page path
    #[validate(length(max = 512, message = "Path too long"))]
    pub path: Option<String>,

    /// Opaque visitor identifier
    #[validate(length(max = 128, message = "Visitor key too long"))]
    pub visitor_key: Option<String>,

    /// Event-specific metadata
    pub metadata: Option<JsonValue>,
}

/// POST /analytics/events
pub async fn record_event(
    State(state): State<AppState>,
    Json(body): Json<RecordEventRequest>,
) -> ApiResult<StatusCode> {
    body.validate().map_err(validation_error)?;

    telemetry::record_analytics(
        &state.db,
        RecordAnalyticsEvent {
            kind: body.kind,
            path: body.path,
            visitor_key: body.visitor_key,
            metadata: body.metadata.unwrap_or_else(|| JsonValue::Object(Default::default())),
        },
    );

    Ok(StatusCode::ACCEPTED)
}
