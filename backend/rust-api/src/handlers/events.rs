use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::session_gate::{evaluate, GateDecision};
use crate::models::{IncomingEvent, StoredEvent};
use crate::services::StoreError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BatchIngestResponse {
    pub success: bool,
    pub accepted: usize,
    pub filtered: usize,
    pub rejected: usize,
}

type ApiError = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> ApiError {
    (status, Json(serde_json::json!({"success": false, "message": message})))
}

async fn record(state: &AppState, incoming: &IncomingEvent) -> Result<(), StoreError> {
    let event = StoredEvent::from_incoming(incoming, Utc::now());
    let session = state
        .store
        .record_event(&event, incoming.session_data.as_ref())
        .await?;
    if let Some(session) = session {
        tracing::debug!(
            "Recorded {} for session {} ({} events)",
            event.event_type,
            session.session_id,
            session.event_count
        );
    }
    Ok(())
}

/// POST /api/analytics/session. The session gate has already run.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(payload): Json<IncomingEvent>,
) -> Result<Json<IngestResponse>, ApiError> {
    if payload.event_type.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "eventType is required"));
    }

    record(&state, &payload).await.map_err(|e| {
        tracing::error!("Error recording analytics event: {:?}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record event")
    })?;

    Ok(Json(IngestResponse {
        success: true,
        message: "Event recorded".to_string(),
    }))
}

/// POST /api/analytics/session/batch. Each element goes through the same gate rule
/// as a single event; malformed elements are counted as rejected.
pub async fn ingest_batch(
    State(state): State<AppState>,
    Json(payload): Json<Vec<Value>>,
) -> Result<Json<BatchIngestResponse>, ApiError> {
    let now = Utc::now();
    let mut response = BatchIngestResponse {
        success: true,
        accepted: 0,
        filtered: 0,
        rejected: 0,
    };

    for raw in payload {
        if let GateDecision::Filter { .. } = evaluate(&raw, now, state.config.min_session_duration_ms) {
            response.filtered += 1;
            continue;
        }

        let incoming = match serde_json::from_value::<IncomingEvent>(raw) {
            Ok(incoming) if !incoming.event_type.trim().is_empty() => incoming,
            _ => {
                response.rejected += 1;
                continue;
            }
        };

        record(&state, &incoming).await.map_err(|e| {
            tracing::error!("Error recording analytics batch: {:?}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record events")
        })?;
        response.accepted += 1;
    }

    if response.filtered > 0 || response.rejected > 0 {
        tracing::debug!(
            "Batch: {} accepted, {} filtered, {} rejected",
            response.accepted,
            response.filtered,
            response.rejected
        );
    }

    Ok(Json(response))
}
