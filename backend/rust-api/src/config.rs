use std::env;

use chrono::Duration;

/// Upper bound for time-window settings: 30 days.
const MAX_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Postgres connection string. When unset the service keeps analytics in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Non-`session_start` events from sessions younger than this are dropped by the gate.
    pub min_session_duration_ms: i64,
    pub session_idle_timeout_secs: i64,
    pub abandoned_cart_after_secs: i64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_event_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: None,
            jwt_secret: "your-secret-key-change-in-production".to_string(),
            min_session_duration_ms: 2000,
            session_idle_timeout_secs: 1800,
            abandoned_cart_after_secs: 3600,
            rate_limit_max_requests: 300,
            rate_limit_window_secs: 60,
            max_event_body_bytes: 64 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT", defaults.port),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            min_session_duration_ms: parse_var("MIN_SESSION_DURATION_MS", defaults.min_session_duration_ms),
            session_idle_timeout_secs: window_secs(
                "SESSION_IDLE_TIMEOUT_SECS",
                parse_var("SESSION_IDLE_TIMEOUT_SECS", defaults.session_idle_timeout_secs),
                defaults.session_idle_timeout_secs,
            ),
            abandoned_cart_after_secs: window_secs(
                "ABANDONED_CART_AFTER_SECS",
                parse_var("ABANDONED_CART_AFTER_SECS", defaults.abandoned_cart_after_secs),
                defaults.abandoned_cart_after_secs,
            ),
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit_max_requests),
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit_window_secs),
            max_event_body_bytes: parse_var("MAX_EVENT_BODY_BYTES", defaults.max_event_body_bytes),
        })
    }

    pub fn session_idle_timeout(&self) -> Duration {
        window("SESSION_IDLE_TIMEOUT_SECS", self.session_idle_timeout_secs, Self::default().session_idle_timeout_secs)
    }

    pub fn abandoned_cart_after(&self) -> Duration {
        window("ABANDONED_CART_AFTER_SECS", self.abandoned_cart_after_secs, Self::default().abandoned_cart_after_secs)
    }
}

// Windows must be positive and at most MAX_WINDOW_SECS.
fn window_secs(key: &str, secs: i64, default: i64) -> i64 {
    if (1..=MAX_WINDOW_SECS).contains(&secs) {
        secs
    } else {
        tracing::warn!("{} must be between 1 and {} seconds, got {}", key, MAX_WINDOW_SECS, secs);
        default
    }
}

fn window(key: &str, secs: i64, default: i64) -> Duration {
    Duration::try_seconds(window_secs(key, secs, default)).unwrap_or_else(|| Duration::seconds(default))
}

// Unparseable values fall back to the default rather than aborting startup.
fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
