use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{SessionData, StoredEvent, SESSION_END, SESSION_START};
use super::ids::SessionId;

/// Server-side aggregate of one browser session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: SessionId,
    pub user: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
    pub event_count: i64,
    pub country: Option<String>,
    pub device: Option<String>,
    pub closed: bool,
}

impl Session {
    fn open(session_id: SessionId, event: &StoredEvent, data: Option<&SessionData>) -> Self {
        let start_time = data
            .and_then(|d| d.start_time)
            .unwrap_or(event.timestamp);
        Self {
            session_id,
            user: event.user_id.clone(),
            start_time,
            end_time: None,
            last_activity: event.timestamp.max(start_time),
            event_count: 1,
            country: data.and_then(|d| d.country.clone()),
            device: data.and_then(|d| d.device.clone()),
            closed: event.is(SESSION_END),
        }
    }

    /// Fold one event into the session, creating it on first sight.
    pub fn apply(existing: Option<Session>, event: &StoredEvent, data: Option<&SessionData>) -> Option<Session> {
        let session_id = event.session_id.clone()?;
        let mut session = match existing {
            None => {
                let mut session = Self::open(session_id, event, data);
                if !event.is(SESSION_START) {
                    session.end_time = Some(session.last_activity);
                }
                return Some(session);
            }
            Some(session) => session,
        };

        session.event_count += 1;
        if event.timestamp > session.last_activity {
            session.last_activity = event.timestamp;
        }
        if !event.is(SESSION_START) {
            session.end_time = Some(session.last_activity);
        }
        if session.user.is_none() {
            session.user = event.user_id.clone();
        }
        if session.country.is_none() {
            session.country = data.and_then(|d| d.country.clone());
        }
        if session.device.is_none() {
            session.device = data.and_then(|d| d.device.clone());
        }
        if event.is(SESSION_END) {
            session.closed = true;
        }
        Some(session)
    }

    /// Milliseconds between start and the last recorded end; 0 while nothing followed the start.
    pub fn duration_ms(&self) -> i64 {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    pub fn close_at_last_activity(&mut self) {
        self.closed = true;
        self.end_time = Some(self.last_activity);
    }
}
