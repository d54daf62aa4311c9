use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use smartedu_client_core::models::PageMetadata;
use smartedu_client_core::{AnalyticsClient, ApiError, ContentClient, Locale, NotFoundExt};

/// Serves `app` on an ephemeral port and returns its base URL.
async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn example(Path((locale, category, slug)): Path<(String, String, String)>) -> (StatusCode, Json<Value>) {
    if slug == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"success": false, "message": "Example not found"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "slug": slug,
                "locale": locale,
                "title": "Praca licencjacka z ekonomii",
                "category": category,
                "metaTitle": "Przykład pracy licencjackiej"
            }
        })),
    )
}

fn content_stub() -> Router {
    Router::new()
        .route("/api/examples/:locale/:category/:slug", get(example))
        .route(
            "/api/threads",
            get(|| async { Json(json!([{"slug": "pisanie", "name": "Pisanie prac"}])) }),
        )
        .route(
            "/api/articles",
            get(|| async {
                Json(json!({"success": true, "data": [{"slug": "jak-pisac", "title": "Jak pisać"}]}))
            }),
        )
        .route(
            "/api/work-types",
            get(|| async { Json(json!([{"slug": "essay", "name": "Esej"}])) }),
        )
        .route(
            "/api/subjects",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
}

#[tokio::test]
async fn fetches_wrapped_example() {
    let client = ContentClient::new(spawn_stub(content_stub()).await);

    let example = client.get_example(Locale::Pl, "ekonomia", "praca-1").await.unwrap();

    assert_eq!(example.slug, "praca-1");
    assert_eq!(example.locale, Locale::Pl);
    assert_eq!(example.category.as_deref(), Some("ekonomia"));
}

#[tokio::test]
async fn missing_example_is_not_found() {
    let client = ContentClient::new(spawn_stub(content_stub()).await);

    let err = client.get_example(Locale::En, "economics", "missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let page = client
        .get_example(Locale::En, "economics", "missing")
        .await
        .or_not_found()
        .unwrap();
    assert!(page.is_none());
}

#[tokio::test]
async fn metadata_falls_back_to_empty() {
    let client = ContentClient::new(spawn_stub(content_stub()).await);

    let found = client.example_metadata(Locale::Pl, "ekonomia", "praca-1").await;
    assert_eq!(found.title.as_deref(), Some("Przykład pracy licencjackiej"));

    let missing = client.example_metadata(Locale::Pl, "ekonomia", "missing").await;
    assert_eq!(missing, PageMetadata::default());
}

#[tokio::test]
async fn blog_index_accepts_both_envelopes() {
    let client = ContentClient::new(spawn_stub(content_stub()).await);

    let (threads, articles) = client.get_threads_and_articles(Locale::Pl).await.unwrap();

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].name, "Pisanie prac");
    assert_eq!(articles[0].slug, "jak-pisac");
}

#[tokio::test]
async fn fan_out_fails_when_one_side_fails() {
    let client = ContentClient::new(spawn_stub(content_stub()).await);

    let err = client.get_work_types_and_subjects().await.unwrap_err();

    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected {:?}", other),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer admin-token")
        .unwrap_or(false)
}

fn analytics_stub() -> Router {
    Router::new()
        .route(
            "/api/admin/analytics/registrations",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})));
                }
                (StatusCode::OK, Json(json!([{"date": "2024-05-01", "count": 3}])))
            }),
        )
        .route(
            "/api/admin/analytics/payments",
            get(|| async {
                Json(json!({"success": true, "data": {"totalAmount": 120.5, "completed": 2}}))
            }),
        )
        .route(
            "/api/admin/analytics/funnel",
            get(|| async {
                Json(json!([
                    {"step": "page_view", "sessions": 10, "conversionFromPrevious": 100.0, "conversionFromStart": 100.0},
                    {"step": "checkout_start", "sessions": 4, "conversionFromPrevious": 40.0, "conversionFromStart": 40.0}
                ]))
            }),
        )
        .route(
            "/api/admin/analytics/geo",
            get(|| async { Json(json!([{"country": "PL", "count": 7}])) }),
        )
}

#[tokio::test]
async fn overview_sends_bearer_token() {
    let base = spawn_stub(analytics_stub()).await;

    let overview = AnalyticsClient::new(base.clone())
        .with_token("admin-token")
        .overview()
        .await
        .unwrap();

    assert_eq!(overview.registrations[0].count, 3);
    assert_eq!(overview.payments.completed, 2);
    assert_eq!(overview.payments.failed, 0);
    assert_eq!(overview.funnel[1].sessions, 4);
    assert_eq!(overview.geo[0].country, "PL");

    let err = AnalyticsClient::new(base).overview().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}
