use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::StoredEvent;

/// Event types that put an order in the cart.
pub const CHECKOUT_EVENTS: [&str; 2] = ["checkout_start", "add_to_cart"];
pub const PAYMENT_COMPLETED: &str = "payment_completed";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbandonedCart {
    pub session_id: String,
    pub user: Option<String>,
    pub checkout_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// `data` of the last checkout event, usually the order draft.
    pub cart: serde_json::Value,
}

#[derive(Default)]
struct CartState<'a> {
    last_checkout: Option<&'a StoredEvent>,
    paid_after_checkout: bool,
    last_activity: Option<DateTime<Utc>>,
    user: Option<&'a str>,
}

/// Sessions that started checkout, never paid afterwards, and whose last checkout
/// event is older than `after`. Most recently active first.
pub fn abandoned_carts(events: &[StoredEvent], now: DateTime<Utc>, after: Duration) -> Vec<AbandonedCart> {
    let mut sorted: Vec<&StoredEvent> = events.iter().filter(|e| e.session_id.is_some()).collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut carts: HashMap<&str, CartState> = HashMap::new();
    for event in sorted {
        let Some(session_id) = event.session_id.as_deref() else {
            continue;
        };
        let state = carts.entry(session_id).or_default();
        state.last_activity = Some(event.timestamp);
        if state.user.is_none() {
            state.user = event.user_id.as_deref();
        }
        if CHECKOUT_EVENTS.contains(&event.event_type.as_str()) {
            state.last_checkout = Some(event);
            state.paid_after_checkout = false;
        } else if event.event_type == PAYMENT_COMPLETED && state.last_checkout.is_some() {
            state.paid_after_checkout = true;
        }
    }

    // Out-of-range windows reach back past the earliest representable time.
    let cutoff = now.checked_sub_signed(after).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut abandoned: Vec<AbandonedCart> = carts
        .into_iter()
        .filter_map(|(session_id, state)| {
            let checkout = state.last_checkout?;
            if state.paid_after_checkout || checkout.timestamp > cutoff {
                return None;
            }
            Some(AbandonedCart {
                session_id: session_id.to_string(),
                user: state.user.map(str::to_string),
                checkout_at: checkout.timestamp,
                last_activity: state.last_activity.unwrap_or(checkout.timestamp),
                cart: checkout.data.clone(),
            })
        })
        .collect();
    abandoned.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    abandoned
}
