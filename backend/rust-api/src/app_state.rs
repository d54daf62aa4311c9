use std::sync::Arc;

use crate::config::Config;
use crate::middleware::RateLimiter;
use crate::services::{AnalyticsStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnalyticsStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn AnalyticsStore>, config: Arc<Config>) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_max_requests, config.rate_limit_window_secs);
        Self {
            store,
            config,
            rate_limiter,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: Config) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(config))
    }
}
