// Library root - the binary and the integration tests build the router from here.

pub mod analytics;
pub mod app_state;
pub mod background;
pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use app_state::AppState;
pub use config::Config;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

async fn health_check() -> &'static str {
    "OK"
}

pub fn build_router(state: AppState) -> Router {
    let ingestion = Router::new()
        .route(
            "/api/analytics/session",
            post(handlers::ingest_event).layer(from_fn_with_state(
                state.clone(),
                middleware::session_gate_middleware,
            )),
        )
        .route("/api/analytics/session/batch", post(handlers::ingest_batch))
        .layer(from_fn_with_state(
            state.rate_limiter.clone(),
            middleware::rate_limit_middleware,
        ));

    let admin = Router::new()
        .route("/api/admin/analytics/summary", get(handlers::get_summary))
        .route("/api/admin/analytics/funnel", get(handlers::get_funnel))
        .route("/api/admin/analytics/abandoned-carts", get(handlers::get_abandoned_carts))
        .route("/api/admin/analytics/sessions", get(handlers::get_sessions))
        .route("/api/admin/analytics/events", get(handlers::get_events))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(ingestion)
        .merge(admin)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
