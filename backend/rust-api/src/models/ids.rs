//! ID aliases. Event ids are server-generated UUIDs; session ids are whatever the
//! browser generated, so they stay opaque strings.

use uuid::Uuid;

pub type EventId = Uuid;
pub type SessionId = String;
