//! Client side of Smart-Edu.AI: locale-aware content fetchers, admin analytics
//! fetchers with their chart/table transforms, and the batching event collector
//! that feeds the analytics ingestion API.

mod api;

pub mod analytics;
pub mod collector;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod views;

pub use api::Envelope;
pub use analytics::AnalyticsClient;
pub use collector::{EventCollector, EventTransport, HttpTransport, SessionContext, TrackedEvent};
pub use config::ClientConfig;
pub use content::ContentClient;
pub use error::{ApiError, NotFoundExt};
pub use models::Locale;
