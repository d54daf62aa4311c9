use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::{self, AbandonedCart, FunnelStep, SummaryMetrics, DEFAULT_FUNNEL_STEPS};
use crate::models::{Session, StoredEvent};
use crate::services::{EventFilter, StoreError};
use crate::AppState;

const DEFAULT_PAGE_SIZE: usize = 100;
const MAX_PAGE_SIZE: usize = 1000;

type ApiError = (StatusCode, Json<Value>);

fn store_error(e: StoreError) -> ApiError {
    tracing::error!("Error reading analytics store: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Database error"})),
    )
}

#[derive(Deserialize)]
pub struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    limit: Option<usize>,
    offset: Option<usize>,
    event_type: Option<String>,
    session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct FunnelQuery {
    /// Comma-separated event types.
    steps: Option<String>,
}

#[derive(Serialize)]
pub struct SessionsPage {
    pub total: usize,
    pub sessions: Vec<Session>,
}

fn page_size(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryMetrics>, ApiError> {
    let sessions = state.store.list_sessions().await.map_err(store_error)?;
    let events = state
        .store
        .list_events(&EventFilter::default())
        .await
        .map_err(store_error)?;
    Ok(Json(analytics::summarize(&sessions, &events)))
}

pub async fn get_funnel(
    Query(params): Query<FunnelQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FunnelStep>>, ApiError> {
    let steps: Vec<String> = match non_empty(params.steps) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_FUNNEL_STEPS.iter().map(|s| s.to_string()).collect(),
    };

    let events = state
        .store
        .list_events(&EventFilter::default())
        .await
        .map_err(store_error)?;
    Ok(Json(analytics::funnel(&events, &steps)))
}

pub async fn get_abandoned_carts(State(state): State<AppState>) -> Result<Json<Vec<AbandonedCart>>, ApiError> {
    let events = state
        .store
        .list_events(&EventFilter::default())
        .await
        .map_err(store_error)?;
    Ok(Json(analytics::abandoned_carts(
        &events,
        Utc::now(),
        state.config.abandoned_cart_after(),
    )))
}

pub async fn get_sessions(
    Query(params): Query<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<SessionsPage>, ApiError> {
    let sessions = state.store.list_sessions().await.map_err(store_error)?;
    let total = sessions.len();
    let sessions = sessions
        .into_iter()
        .skip(params.offset.unwrap_or(0))
        .take(page_size(params.limit))
        .collect();
    Ok(Json(SessionsPage { total, sessions }))
}

pub async fn get_events(
    Query(params): Query<EventQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredEvent>>, ApiError> {
    let filter = EventFilter {
        event_type: non_empty(params.event_type),
        session_id: non_empty(params.session_id),
        since: None,
        limit: Some(page_size(params.limit)),
        offset: params.offset.unwrap_or(0),
    };
    let events = state.store.list_events(&filter).await.map_err(store_error)?;
    Ok(Json(events))
}
