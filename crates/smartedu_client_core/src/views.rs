//! Display transforms for the admin analytics dashboard. Inputs are records the
//! API already aggregated; nothing here fetches.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Home page tracking sub-types shown as a single slice.
pub const HOME_TRACKING_TYPES: [&str; 6] = [
    "visibility",
    "engagement",
    "heroInteraction",
    "ctaClick",
    "featureHover",
    "serviceInteraction",
];
pub const HOME_TRACKING: &str = "homeTracking";

pub const PERFORMANCE_KEYS: [&str; 5] = [
    "loadTime",
    "renderTime",
    "networkLatency",
    "firstPaint",
    "firstContentfulPaint",
];

const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivityBucket {
    pub name: String,
    pub count: usize,
}

/// Event counts per type for the activity pie chart, in order of first appearance.
pub fn activity_overview(records: &[Value]) -> Vec<ActivityBucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<ActivityBucket> = Vec::new();

    for record in records {
        let event_type = record.get("eventType").and_then(Value::as_str).unwrap_or("unknown");
        let name = if HOME_TRACKING_TYPES.contains(&event_type) {
            HOME_TRACKING
        } else {
            event_type
        };

        match index.get(name) {
            Some(&i) => buckets[i].count += 1,
            None => {
                index.insert(name.to_string(), buckets.len());
                buckets.push(ActivityBucket {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }
    buckets
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceMetric {
    pub key: &'static str,
    pub samples: usize,
    pub average_ms: Option<f64>,
    pub display: String,
}

fn metric_value(record: &Value, key: &str) -> Option<f64> {
    record
        .get("data")
        .and_then(|data| data.get(key))
        .or_else(|| record.get(key))
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

/// Mean of each performance metric over all records that report it as a number.
pub fn performance_metrics(records: &[Value]) -> Vec<PerformanceMetric> {
    PERFORMANCE_KEYS
        .iter()
        .map(|&key| {
            let (sum, samples) = records
                .iter()
                .filter_map(|record| metric_value(record, key))
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            let average_ms = (samples > 0).then(|| sum / samples as f64);
            PerformanceMetric {
                key,
                samples,
                average_ms,
                display: average_ms.map(format_duration_ms).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            }
        })
        .collect()
}

/// `"840ms"` below one second, `"1.25s"` from one second up.
pub fn format_duration_ms(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{}ms", ms.round() as i64)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Dashboard headline numbers as served by `/api/admin/analytics/summary`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryMetrics {
    pub total_sessions: u64,
    pub active_sessions: u64,
    pub unique_users: u64,
    pub total_events: u64,
    pub average_session_duration_ms: i64,
    pub average_events_per_session: f64,
    pub bounce_rate: f64,
    pub top_countries: Vec<CountryCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCount {
    pub country: String,
    pub sessions: u64,
}

impl SummaryMetrics {
    /// Label/value pairs for the summary cards.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Sessions", self.total_sessions.to_string()),
            ("Active sessions", self.active_sessions.to_string()),
            ("Unique users", self.unique_users.to_string()),
            ("Events", self.total_events.to_string()),
            ("Avg. session", format_duration_ms(self.average_session_duration_ms as f64)),
            ("Events / session", format!("{:.2}", self.average_events_per_session)),
            ("Bounce rate", format!("{:.1}%", self.bounce_rate)),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub session_id: String,
    #[serde(default)]
    pub user: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_count: i64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

impl SessionRow {
    pub fn duration_display(&self) -> String {
        match self.end_time {
            Some(end) => format_duration_ms((end - self.start_time).num_milliseconds().max(0) as f64),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Newest sessions first, cut to `limit` rows.
pub fn sessions_table(mut sessions: Vec<SessionRow>, limit: usize) -> Vec<SessionRow> {
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sessions.truncate(limit);
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn home_tracking_types_collapse_into_one_bucket() {
        let records = vec![
            json!({"eventType": "page_view"}),
            json!({"eventType": "ctaClick"}),
            json!({"eventType": "heroInteraction"}),
            json!({"eventType": "page_view"}),
            json!({"eventType": "featureHover"}),
            json!({}),
        ];

        assert_eq!(
            activity_overview(&records),
            vec![
                ActivityBucket { name: "page_view".into(), count: 2 },
                ActivityBucket { name: HOME_TRACKING.into(), count: 3 },
                ActivityBucket { name: "unknown".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn performance_means_skip_non_numeric_values() {
        let records = vec![
            json!({"data": {"loadTime": 800, "renderTime": "fast"}}),
            json!({"data": {"loadTime": 1700}}),
            json!({"loadTime": 1500, "networkLatency": null}),
        ];

        let metrics = performance_metrics(&records);
        let load = metrics.iter().find(|m| m.key == "loadTime").unwrap();
        assert_eq!(load.samples, 3);
        assert!((load.average_ms.unwrap() - 4000.0 / 3.0).abs() < 1e-9);
        assert_eq!(load.display, "1.33s");

        let render = metrics.iter().find(|m| m.key == "renderTime").unwrap();
        assert_eq!(render.samples, 0);
        assert_eq!(render.display, "N/A");
    }

    #[test]
    fn formats_milliseconds_and_seconds() {
        assert_eq!(format_duration_ms(412.4), "412ms");
        assert_eq!(format_duration_ms(999.6), "1000ms");
        assert_eq!(format_duration_ms(1000.0), "1.00s");
        assert_eq!(format_duration_ms(2500.0), "2.50s");
    }

    #[test]
    fn sessions_sorted_by_start_time_desc() {
        let now = Utc::now();
        let row = |id: &str, mins_ago: i64| SessionRow {
            session_id: id.into(),
            user: None,
            start_time: now - Duration::minutes(mins_ago),
            end_time: None,
            event_count: 1,
            country: None,
            closed: false,
        };

        let table = sessions_table(vec![row("b", 20), row("a", 5), row("c", 60)], 2);
        let ids: Vec<&str> = table.iter().map(|r| r.session_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(table[0].duration_display(), "N/A");
    }

    #[test]
    fn summary_rows_format_values() {
        let summary = SummaryMetrics {
            total_sessions: 12,
            average_session_duration_ms: 83_000,
            bounce_rate: 41.666,
            ..Default::default()
        };
        let rows = summary.display_rows();
        assert!(rows.contains(&("Sessions", "12".to_string())));
        assert!(rows.contains(&("Avg. session", "83.00s".to_string())));
        assert!(rows.contains(&("Bounce rate", "41.7%".to_string())));
    }
}
