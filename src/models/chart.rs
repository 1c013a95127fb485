// Chart output: one flat record per bucket, plus tick labels for the charting side

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::bucket::MetricRow;

/// One bucket of a query result: `{ "timestamp": .., "By Device": .., <metric>: .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub timestamp: i64,
    #[serde(rename = "By Device")]
    pub by_device: u64,
    #[serde(flatten)]
    pub metrics: MetricRow,
}

/// Chronological records, at most the 18 most recent buckets.
pub type QueryResult = Vec<ChartRecord>;

/// What the panel displays. Consumers keep the highest `generation` they have seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub generation: u64,
    pub keys: Vec<String>,
    pub data: QueryResult,
    /// `HH:MM` label for each record in `data`.
    pub labels: Vec<String>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Formats a bucket's epoch second as `HH:MM` wall-clock time in `tz`.
pub fn format_epoch(epoch_secs: i64, tz: &Tz) -> String {
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => epoch_secs.to_string(),
    }
}
