use axum::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Session, SessionData, StoredEvent};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Filter for event listings. Results are always newest first.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<String>,
    pub session_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl EventFilter {
    pub fn matches(&self, event: &StoredEvent) -> bool {
        if let Some(event_type) = &self.event_type {
            if event.event_type.to_lowercase() != event_type.to_lowercase() {
                return false;
            }
        }
        if let Some(session_id) = &self.session_id {
            if event.session_id.as_deref() != Some(session_id.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// Persistence for raw events and their session aggregates.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Append the event and fold it into its session in one step.
    /// Returns the updated session when the event carried a session id.
    async fn record_event(
        &self,
        event: &StoredEvent,
        session_data: Option<&SessionData>,
    ) -> Result<Option<Session>, StoreError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// All sessions, newest `start_time` first.
    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError>;

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>, StoreError>;

    /// Close open sessions whose last activity is before `cutoff`. Returns how many were closed.
    async fn close_idle_sessions(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
