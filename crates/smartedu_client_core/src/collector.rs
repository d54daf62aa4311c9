//! Browser-side event collector: stamps events with the session context and
//! posts them to the ingestion API in batches.
//!
//! Delivery is best effort. A batch that fails to send is logged and dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::post_json;
use crate::config::{trim_url, ClientConfig};
use crate::error::ApiError;

pub const SESSION_START: &str = "session_start";
pub const SESSION_END: &str = "session_end";
pub const DEFAULT_MAX_BATCH: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SessionContext {
    /// A session starting now with a random id.
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            user_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEvent {
    pub event_type: String,
    pub session_data: SessionContext,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn send_batch(&self, events: &[TrackedEvent]) -> Result<(), ApiError>;
}

/// Posts batches to `{BASE_URL}/api/analytics/session/batch`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            endpoint: format!("{}/api/analytics/session/batch", trim_url(base_url.into())),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone())
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn send_batch(&self, events: &[TrackedEvent]) -> Result<(), ApiError> {
        let response = post_json(&self.endpoint, events).await?;
        log::debug!("Analytics batch response: {}", response);
        Ok(())
    }
}

pub struct EventCollector<T> {
    transport: T,
    session: SessionContext,
    buffer: Vec<TrackedEvent>,
    max_batch: usize,
}

impl<T: EventTransport> EventCollector<T> {
    pub fn new(transport: T, session: SessionContext) -> Self {
        Self::with_batch_size(transport, session, DEFAULT_MAX_BATCH)
    }

    /// The collector opens with a buffered `session_start` event.
    pub fn with_batch_size(transport: T, session: SessionContext, max_batch: usize) -> Self {
        let mut collector = Self {
            transport,
            session,
            buffer: Vec::new(),
            max_batch: max_batch.max(1),
        };
        collector.push(SESSION_START, None);
        collector
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn push(&mut self, event_type: &str, data: Option<Value>) {
        self.buffer.push(TrackedEvent {
            event_type: event_type.to_string(),
            session_data: self.session.clone(),
            timestamp: Utc::now(),
            data,
        });
    }

    /// Buffer an interaction; sends the batch once it is full.
    pub async fn track(&mut self, event_type: &str, data: Option<Value>) {
        self.push(event_type, data);
        if self.buffer.len() >= self.max_batch {
            if let Err(e) = self.flush().await {
                log::debug!("Automatic flush failed: {}", e);
            }
        }
    }

    /// Send everything buffered. Returns the number of events delivered.
    pub async fn flush(&mut self) -> Result<usize, ApiError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut self.buffer);
        match self.transport.send_batch(&batch).await {
            Ok(()) => Ok(batch.len()),
            Err(e) => {
                log::warn!("Dropping {} analytics events: {}", batch.len(), e);
                Err(e)
            }
        }
    }

    /// Record `session_end` and flush what is left.
    pub async fn end_session(mut self) -> Result<usize, ApiError> {
        self.push(SESSION_END, None);
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingTransport {
        batches: Arc<Mutex<Vec<Vec<TrackedEvent>>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventTransport for RecordingTransport {
        async fn send_batch(&self, events: &[TrackedEvent]) -> Result<(), ApiError> {
            if self.fail {
                return Err(ApiError::Status { status: 503, body: "unavailable".into() });
            }
            self.batches.lock().unwrap().push(events.to_vec());
            Ok(())
        }
    }

    fn event_types(batch: &[TrackedEvent]) -> Vec<&str> {
        batch.iter().map(|e| e.event_type.as_str()).collect()
    }

    #[tokio::test]
    async fn starts_with_session_start_and_flushes_when_full() {
        let transport = RecordingTransport::default();
        let batches = transport.batches.clone();
        let mut collector = EventCollector::with_batch_size(transport, SessionContext::new(None), 3);

        collector.track("page_view", None).await;
        assert_eq!(collector.pending(), 2);
        collector.track("ctaClick", Some(json!({"cta": "order"}))).await;

        assert_eq!(collector.pending(), 0);
        let sent = batches.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(event_types(&sent[0]), vec!["session_start", "page_view", "ctaClick"]);
    }

    #[tokio::test]
    async fn every_event_carries_the_session_context() {
        let transport = RecordingTransport::default();
        let batches = transport.batches.clone();
        let session = SessionContext::new(Some("user-7".into()));
        let mut collector = EventCollector::new(transport, session.clone());

        collector.track("scroll", None).await;
        assert_eq!(collector.end_session().await.unwrap(), 3);

        let sent = batches.lock().unwrap();
        assert!(sent[0].iter().all(|e| e.session_data == session));
        assert_eq!(event_types(&sent[0]), vec!["session_start", "scroll", "session_end"]);
    }

    #[tokio::test]
    async fn failed_batches_are_dropped() {
        let transport = RecordingTransport { fail: true, ..Default::default() };
        let mut collector = EventCollector::new(transport, SessionContext::new(None));

        assert!(collector.flush().await.is_err());
        assert_eq!(collector.pending(), 0);
        assert_eq!(collector.flush().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn automatic_flush_failure_clears_the_buffer() {
        let transport = RecordingTransport { fail: true, ..Default::default() };
        let mut collector = EventCollector::with_batch_size(transport, SessionContext::new(None), 2);

        collector.track("page_view", None).await;
        assert_eq!(collector.pending(), 0);

        collector.track("scroll", None).await;
        assert_eq!(collector.pending(), 1);
    }

    #[test]
    fn wire_format_matches_ingestion_api() {
        let session = SessionContext {
            session_id: "s-1".into(),
            start_time: "2024-05-01T10:00:00Z".parse().unwrap(),
            user_id: None,
        };
        let event = TrackedEvent {
            event_type: "click".into(),
            session_data: session,
            timestamp: "2024-05-01T10:00:05Z".parse().unwrap(),
            data: None,
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "eventType": "click",
                "sessionData": {"sessionId": "s-1", "startTime": "2024-05-01T10:00:00Z"},
                "timestamp": "2024-05-01T10:00:05Z"
            })
        );
    }
}
