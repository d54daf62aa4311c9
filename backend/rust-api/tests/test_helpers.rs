// Test helpers for building the router over an in-memory store

#![allow(dead_code)]

use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use smartedu_analytics_api::{build_router, middleware::Claims, AppState, Config};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        jwt_secret: TEST_SECRET.to_string(),
        rate_limit_max_requests: 0,
        ..Config::default()
    }
}

pub fn test_app() -> (Router, AppState) {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> (Router, AppState) {
    let state = AppState::in_memory(config);
    (build_router(state.clone()), state)
}

pub fn token_with_role(role: Option<&str>) -> String {
    let claims = Claims {
        user_id: "admin-1".to_string(),
        email: "admin@smart-edu.ai".to_string(),
        role: role.map(str::to_string),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_ref()))
        .expect("Failed to sign test token")
}

pub fn admin_token() -> String {
    token_with_role(Some("admin"))
}

/// RFC 3339 timestamp `ms` milliseconds in the past.
pub fn millis_ago(ms: i64) -> String {
    (Utc::now() - Duration::milliseconds(ms)).to_rfc3339()
}
