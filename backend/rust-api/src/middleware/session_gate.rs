//! Drops analytics events from sessions that are too young to be meaningful.
//!
//! `session_start` always passes. Any other event whose `sessionData.startTime`
//! lies less than the configured threshold in the past is answered with
//! `200 {"success":true,"filtered":true}` and never reaches the handler.
//! Requests without a usable start time pass through untouched.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::SESSION_START;
use crate::utils::time::parse_timestamp;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Forward,
    Filter { duration_ms: i64 },
}

#[derive(Debug, Serialize)]
pub struct FilteredResponse {
    pub success: bool,
    pub filtered: bool,
}

impl FilteredResponse {
    pub fn filtered() -> Self {
        Self {
            success: true,
            filtered: true,
        }
    }
}

/// Decide whether an event body should reach the ingestion handler.
pub fn evaluate(body: &Value, now: DateTime<Utc>, min_duration_ms: i64) -> GateDecision {
    if body.get("eventType").and_then(Value::as_str) == Some(SESSION_START) {
        return GateDecision::Forward;
    }

    let start_time = body
        .get("sessionData")
        .and_then(|session| session.get("startTime"))
        .and_then(parse_timestamp);

    match start_time {
        Some(start) => {
            let duration_ms = (now - start).num_milliseconds();
            if duration_ms < min_duration_ms {
                GateDecision::Filter { duration_ms }
            } else {
                GateDecision::Forward
            }
        }
        None => GateDecision::Forward,
    }
}

/// Same rule applied to raw bytes; a body that is not JSON is forwarded.
pub fn evaluate_bytes(bytes: &Bytes, now: DateTime<Utc>, min_duration_ms: i64) -> GateDecision {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(body) => evaluate(&body, now, min_duration_ms),
        Err(_) => GateDecision::Forward,
    }
}

pub async fn session_gate_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, state.config.max_event_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Rejecting analytics body: {}", e);
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(serde_json::json!({"success": false, "message": "Request body too large"})),
            )
                .into_response();
        }
    };

    match evaluate_bytes(&bytes, Utc::now(), state.config.min_session_duration_ms) {
        GateDecision::Filter { duration_ms } => {
            tracing::debug!("Filtered event from {}ms old session", duration_ms);
            Json(FilteredResponse::filtered()).into_response()
        }
        GateDecision::Forward => next.run(Request::from_parts(parts, Body::from(bytes))).await,
    }
}
