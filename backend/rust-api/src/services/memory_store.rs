use std::collections::HashMap;

use axum::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::analytics_store::{AnalyticsStore, EventFilter, StoreError};
use crate::models::{Session, SessionData, StoredEvent};

#[derive(Default)]
struct Inner {
    events: Vec<StoredEvent>,
    sessions: HashMap<String, Session>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and in tests.
/// Unbounded: events and sessions are kept until the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn record_event(
        &self,
        event: &StoredEvent,
        session_data: Option<&SessionData>,
    ) -> Result<Option<Session>, StoreError> {
        let mut inner = self.inner.write().await;
        inner.events.push(event.clone());

        let Some(session_id) = event.session_id.clone() else {
            return Ok(None);
        };
        let existing = inner.sessions.remove(&session_id);
        let updated = Session::apply(existing, event, session_data);
        if let Some(session) = &updated {
            inner.sessions.insert(session_id, session.clone());
        }
        Ok(updated)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.inner.read().await.sessions.get(session_id).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        let inner = self.inner.read().await;
        let mut events: Vec<StoredEvent> = inner
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let events = events.into_iter().skip(filter.offset);
        Ok(match filter.limit {
            Some(limit) => events.take(limit).collect(),
            None => events.collect(),
        })
    }

    async fn close_idle_sessions(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut closed = 0;
        for session in inner.sessions.values_mut() {
            if !session.closed && session.last_activity < cutoff {
                session.close_at_last_activity();
                closed += 1;
            }
        }
        Ok(closed)
    }
}
