//! Aggregations over stored sessions and events. Everything here is pure so the
//! admin handlers can run it over any store snapshot.

pub mod abandoned_cart;
pub mod funnel;
pub mod summary;

pub use abandoned_cart::{abandoned_carts, AbandonedCart, CHECKOUT_EVENTS, PAYMENT_COMPLETED};
pub use funnel::{funnel, FunnelStep, DEFAULT_FUNNEL_STEPS};
pub use summary::{summarize, CountryCount, SummaryMetrics};

/// Percentage with one decimal place; 0 when nothing to divide by.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}
