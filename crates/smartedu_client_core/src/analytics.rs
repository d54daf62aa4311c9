//! Admin dashboard fetchers. The API does the aggregation; see `views` for
//! the display transforms applied afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::get_json;
use crate::config::{trim_url, ClientConfig};
use crate::error::ApiError;
use crate::views::{SessionRow, SummaryMetrics};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentsSummary {
    pub total_amount: f64,
    pub completed: u64,
    pub failed: u64,
    pub pending: u64,
    pub daily: Vec<DailyCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    pub step: String,
    pub sessions: u64,
    #[serde(default)]
    pub conversion_from_previous: f64,
    #[serde(default)]
    pub conversion_from_start: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBucket {
    pub country: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SessionsPage {
    pub total: u64,
    pub sessions: Vec<SessionRow>,
}

/// Everything the dashboard landing view shows.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardOverview {
    pub registrations: Vec<DailyCount>,
    pub payments: PaymentsSummary,
    pub funnel: Vec<FunnelStep>,
    pub geo: Vec<GeoBucket>,
}

#[derive(Clone, Debug)]
pub struct AnalyticsClient {
    api_url: String,
    token: Option<String>,
}

impl AnalyticsClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: trim_url(api_url.into()),
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Bearer token of the signed-in admin; obtaining it is the caller's job.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/api/admin/analytics{}", self.api_url, path);
        get_json(&url, self.token.as_deref()).await
    }

    pub async fn registrations(&self) -> Result<Vec<DailyCount>, ApiError> {
        self.get("/registrations").await
    }

    pub async fn payments(&self) -> Result<PaymentsSummary, ApiError> {
        self.get("/payments").await
    }

    pub async fn funnel(&self) -> Result<Vec<FunnelStep>, ApiError> {
        self.get("/funnel").await
    }

    pub async fn geo(&self) -> Result<Vec<GeoBucket>, ApiError> {
        self.get("/geo").await
    }

    pub async fn summary(&self) -> Result<SummaryMetrics, ApiError> {
        self.get("/summary").await
    }

    pub async fn sessions(&self, limit: usize) -> Result<SessionsPage, ApiError> {
        self.get(&format!("/sessions?limit={}", limit)).await
    }

    /// Raw event records, for `views::activity_overview` and `views::performance_metrics`.
    pub async fn events(&self, limit: usize, event_type: Option<&str>) -> Result<Vec<Value>, ApiError> {
        let path = match event_type {
            Some(event_type) => format!("/events?limit={}&eventType={}", limit, urlencoding::encode(event_type)),
            None => format!("/events?limit={}", limit),
        };
        self.get(&path).await
    }

    /// All landing widgets in parallel; the first failure fails the whole view.
    pub async fn overview(&self) -> Result<DashboardOverview, ApiError> {
        let (registrations, payments, funnel, geo) =
            futures::try_join!(self.registrations(), self.payments(), self.funnel(), self.geo())?;
        Ok(DashboardOverview {
            registrations,
            payments,
            funnel,
            geo,
        })
    }
}
