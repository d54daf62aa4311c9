pub mod analytics_store;
pub mod memory_store;
pub mod pg_store;

pub use analytics_store::{AnalyticsStore, EventFilter, StoreError};
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
