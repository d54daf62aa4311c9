use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

const CLEANUP_THRESHOLD: usize = 10_000;

#[derive(Clone)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window per-client limiter for the public ingestion endpoints.
#[derive(Clone)]
pub struct RateLimiter {
    limits: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// When 0, rate limiting is disabled (useful for local dev/testing).
    pub fn is_disabled(&self) -> bool {
        self.max_requests == 0
    }

    pub async fn check_limit(&self, key: &str) -> Result<(), StatusCode> {
        let mut limits = self.limits.write().await;
        let now = Instant::now();

        if limits.len() > CLEANUP_THRESHOLD {
            limits.retain(|_, entry| entry.reset_at > now);
        }

        match limits.get_mut(key) {
            Some(entry) if entry.reset_at <= now => {
                entry.count = 1;
                entry.reset_at = now + self.window;
                Ok(())
            }
            Some(entry) if entry.count >= self.max_requests => Err(StatusCode::TOO_MANY_REQUESTS),
            Some(entry) => {
                entry.count += 1;
                Ok(())
            }
            None => {
                limits.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
        }
    }
}

// Client address as reported by the reverse proxy in front of the service.
fn extract_ip(req: &Request) -> String {
    if let Some(forwarded_for) = req.headers().get("x-forwarded-for") {
        if let Ok(ip) = forwarded_for.to_str() {
            return ip.split(',').next().unwrap_or("unknown").trim().to_string();
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.to_string();
        }
    }

    "unknown".to_string()
}

pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if rate_limiter.is_disabled() {
        return Ok(next.run(req).await);
    }

    let ip = extract_ip(&req);
    if let Err(status) = rate_limiter.check_limit(&ip).await {
        tracing::warn!("Rate limit exceeded for {}", ip);
        return Err(status);
    }

    Ok(next.run(req).await)
}
