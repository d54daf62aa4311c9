use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::percentage;
use crate::models::{Session, StoredEvent};

const TOP_COUNTRIES: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub unique_users: usize,
    pub total_events: usize,
    pub average_session_duration_ms: i64,
    pub average_events_per_session: f64,
    /// Share of sessions with at most one event, in percent.
    pub bounce_rate: f64,
    pub top_countries: Vec<CountryCount>,
}

pub fn summarize(sessions: &[Session], events: &[StoredEvent]) -> SummaryMetrics {
    let total_sessions = sessions.len();
    let active_sessions = sessions.iter().filter(|s| !s.closed).count();

    let unique_users = sessions
        .iter()
        .filter_map(|s| s.user.as_deref())
        .chain(events.iter().filter_map(|e| e.user_id.as_deref()))
        .collect::<HashSet<_>>()
        .len();

    let (average_session_duration_ms, average_events_per_session) = if total_sessions == 0 {
        (0, 0.0)
    } else {
        let total_duration: i64 = sessions.iter().map(Session::duration_ms).sum();
        let total_session_events: i64 = sessions.iter().map(|s| s.event_count).sum();
        (
            total_duration / total_sessions as i64,
            (total_session_events as f64 * 100.0 / total_sessions as f64).round() / 100.0,
        )
    };

    let bounced = sessions.iter().filter(|s| s.event_count <= 1).count();

    let mut by_country: HashMap<&str, usize> = HashMap::new();
    for country in sessions.iter().filter_map(|s| s.country.as_deref()) {
        *by_country.entry(country).or_default() += 1;
    }
    let mut top_countries: Vec<CountryCount> = by_country
        .into_iter()
        .map(|(country, sessions)| CountryCount {
            country: country.to_string(),
            sessions,
        })
        .collect();
    top_countries.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.country.cmp(&b.country)));
    top_countries.truncate(TOP_COUNTRIES);

    SummaryMetrics {
        total_sessions,
        active_sessions,
        unique_users,
        total_events: events.len(),
        average_session_duration_ms,
        average_events_per_session,
        bounce_rate: percentage(bounced, total_sessions),
        top_countries,
    }
}
