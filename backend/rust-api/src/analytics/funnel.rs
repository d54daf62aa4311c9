use std::collections::HashMap;

use serde::Serialize;

use super::percentage;
use crate::models::StoredEvent;

pub const DEFAULT_FUNNEL_STEPS: [&str; 4] = [
    "page_view",
    "order_form_open",
    "checkout_start",
    "payment_completed",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    pub step: String,
    pub sessions: usize,
    pub conversion_from_previous: f64,
    pub conversion_from_start: f64,
}

/// Count sessions that reached each step after completing every earlier step in order.
///
/// Events without a session id cannot be followed through the funnel and are skipped.
pub fn funnel(events: &[StoredEvent], steps: &[String]) -> Vec<FunnelStep> {
    let mut by_session: HashMap<&str, Vec<&StoredEvent>> = HashMap::new();
    for event in events {
        if let Some(session_id) = event.session_id.as_deref() {
            by_session.entry(session_id).or_default().push(event);
        }
    }

    let mut reached = vec![0usize; steps.len()];
    for session_events in by_session.values_mut() {
        session_events.sort_by_key(|e| e.timestamp);
        let mut next = 0;
        for event in session_events.iter() {
            if next == steps.len() {
                break;
            }
            if event.event_type == steps[next] {
                reached[next] += 1;
                next += 1;
            }
        }
    }

    let start = reached.first().copied().unwrap_or(0);
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let previous = if i == 0 { reached[0] } else { reached[i - 1] };
            FunnelStep {
                step: step.clone(),
                sessions: reached[i],
                conversion_from_previous: percentage(reached[i], previous),
                conversion_from_start: percentage(reached[i], start),
            }
        })
        .collect()
}
