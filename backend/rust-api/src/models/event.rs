use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{EventId, SessionId};

pub const SESSION_START: &str = "session_start";
pub const SESSION_END: &str = "session_end";

/// Session context the browser attaches to every tracked event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default, deserialize_with = "crate::utils::time::deserialize_lenient")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

/// Body of `POST /api/analytics/session`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEvent {
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub session_data: Option<SessionData>,
    #[serde(default, deserialize_with = "crate::utils::time::deserialize_lenient")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub id: EventId,
    pub event_type: String,
    pub session_id: Option<SessionId>,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl StoredEvent {
    /// Stamp an incoming event. `received_at` is used when the client sent no timestamp.
    pub fn from_incoming(incoming: &IncomingEvent, received_at: DateTime<Utc>) -> Self {
        let session = incoming.session_data.as_ref();
        Self {
            id: Uuid::new_v4(),
            event_type: incoming.event_type.trim().to_string(),
            session_id: session.and_then(|s| s.session_id.clone()),
            user_id: session.and_then(|s| s.user_id.clone()),
            timestamp: incoming.timestamp.unwrap_or(received_at),
            data: incoming.data.clone().unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }
}
