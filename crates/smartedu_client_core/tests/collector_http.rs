use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::post, Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use smartedu_client_core::{EventCollector, HttpTransport, SessionContext};

type Received = Arc<Mutex<Vec<Value>>>;

async fn batch(State(received): State<Received>, Json(events): Json<Vec<Value>>) -> Json<Value> {
    let accepted = events.len();
    received.lock().unwrap().extend(events);
    Json(json!({"success": true, "accepted": accepted, "filtered": 0, "rejected": 0}))
}

#[tokio::test]
async fn posts_batches_to_ingestion_endpoint() {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/api/analytics/session/batch", post(batch))
        .with_state(received.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let session = SessionContext::new(Some("user-1".into()));
    let mut collector = EventCollector::new(HttpTransport::new(base), session.clone());
    collector.track("page_view", Some(json!({"path": "/pl/przyklady"}))).await;
    let delivered = collector.end_session().await.unwrap();

    assert_eq!(delivered, 3);
    let received = received.lock().unwrap();
    let types: Vec<&str> = received.iter().filter_map(|e| e["eventType"].as_str()).collect();
    assert_eq!(types, vec!["session_start", "page_view", "session_end"]);
    assert!(received
        .iter()
        .all(|e| e["sessionData"]["sessionId"] == json!(session.session_id)));
    assert_eq!(received[1]["data"]["path"], json!("/pl/przyklady"));
}
