// Shared test helpers
#![allow(dead_code)]

use heatfence::models::*;

pub fn ev(lon: f64, lat: f64, timestamp: i64, device: &str) -> Event {
    Event::new(lon, lat, timestamp, device)
}

/// Orders events the way the data source delivers them: newest first.
pub fn newest_first(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

/// Closed axis-aligned square ring.
pub fn square(min: f64, max: f64) -> Vec<LonLat> {
    vec![[min, min], [max, min], [max, max], [min, max], [min, min]]
}

pub fn docs_frame(events: Vec<Event>) -> Frame {
    Frame {
        name: DOCS_SERIES.into(),
        events,
        ..Default::default()
    }
}

pub fn metric_frame(name: &str, times_ms: Vec<i64>, values: Vec<f64>) -> Frame {
    Frame {
        name: name.into(),
        times_ms,
        values,
        ..Default::default()
    }
}

pub fn batch(series: Vec<Frame>) -> FrameBatch {
    FrameBatch { series }
}

/// One point per bucket for `buckets` consecutive buckets starting at 600, all at (0.5, 0.5).
pub fn consecutive_buckets(buckets: i64, device: &str) -> Vec<Event> {
    newest_first(
        (1..=buckets)
            .map(|i| ev(0.5, 0.5, i * BUCKET_WIDTH + 10, device))
            .collect(),
    )
}
