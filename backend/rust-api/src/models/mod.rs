//! Analytics wire and storage types. Timestamps are chrono `DateTime<Utc>`.

pub mod event;
pub mod ids;
pub mod session;

pub use event::{IncomingEvent, SessionData, StoredEvent, SESSION_END, SESSION_START};
pub use ids::{EventId, SessionId};
pub use session::Session;
