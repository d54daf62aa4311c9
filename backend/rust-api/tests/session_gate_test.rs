// End-to-end checks of the session gate in front of the ingestion handler.
// A filtered request must answer {success, filtered} and leave the store untouched.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use smartedu_analytics_api::services::EventFilter;
use tower::ServiceExt;

mod test_helpers;
use test_helpers::*;

async fn post_event(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analytics/session")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn stored_events(state: &smartedu_analytics_api::AppState) -> usize {
    state.store.list_events(&EventFilter::default()).await.unwrap().len()
}

#[tokio::test]
async fn young_session_event_is_filtered_and_not_stored() {
    let (app, state) = test_app();
    let (status, body) = post_event(
        app,
        json!({"eventType": "click", "sessionData": {"sessionId": "s1", "startTime": millis_ago(500)}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "filtered": true}));
    assert_eq!(stored_events(&state).await, 0);
}

#[tokio::test]
async fn established_session_event_is_forwarded() {
    let (app, state) = test_app();
    let (status, body) = post_event(
        app,
        json!({"eventType": "click", "sessionData": {"sessionId": "s1", "startTime": millis_ago(5000)}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Event recorded"));
    assert!(body.get("filtered").is_none());
    assert_eq!(stored_events(&state).await, 1);
}

#[tokio::test]
async fn session_start_is_always_forwarded() {
    let (app, state) = test_app();
    let (status, body) = post_event(
        app,
        json!({"eventType": "session_start", "sessionData": {"sessionId": "s1", "startTime": millis_ago(0)}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Event recorded"));
    let session = state.store.get_session("s1").await.unwrap().expect("session created");
    assert_eq!(session.event_count, 1);
}

#[tokio::test]
async fn event_without_session_data_is_forwarded() {
    let (app, state) = test_app();
    let (status, _) = post_event(app, json!({"eventType": "click"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_events(&state).await, 1);
}

#[tokio::test]
async fn forwarded_event_without_type_is_rejected_by_handler() {
    let (app, _) = test_app();
    let (status, body) = post_event(app, json!({"sessionData": {"startTime": millis_ago(10_000)}})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _) = test_app();
    let padding = "x".repeat(128 * 1024);
    let (status, _) = post_event(app, json!({"eventType": "click", "data": {"padding": padding}})).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
