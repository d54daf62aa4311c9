pub mod analytics;
pub mod events;

pub use analytics::{get_abandoned_carts, get_events, get_funnel, get_sessions, get_summary, SessionsPage};
pub use events::{ingest_batch, ingest_event, BatchIngestResponse, IngestResponse};
