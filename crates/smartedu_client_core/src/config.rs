use std::env;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Endpoints the web front end talks to. Read once when a client is built.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// External REST API (`NEXT_PUBLIC_API_URL`).
    pub api_url: String,
    /// Public site origin (`NEXT_PUBLIC_BASE_URL`); analytics events are posted here.
    pub base_url: String,
    /// S3 bucket holding order attachments (`NEXT_AWS_BUCKET_NAME`).
    pub bucket_name: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket_name: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            api_url: trim_url(read("NEXT_PUBLIC_API_URL").unwrap_or(defaults.api_url)),
            base_url: trim_url(read("NEXT_PUBLIC_BASE_URL").unwrap_or(defaults.base_url)),
            bucket_name: read("NEXT_AWS_BUCKET_NAME"),
        }
    }
}

pub(crate) fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
