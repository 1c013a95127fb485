// Input data: raw device pings ("docs" frame) and externally aggregated series

use serde::{Deserialize, Serialize};

/// Name of the frame carrying raw device pings.
pub const DOCS_SERIES: &str = "docs";

/// One geolocated ping from one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(alias = "hash_id")]
    pub device_id: String,
}

impl Event {
    pub fn new(longitude: f64, latitude: f64, timestamp: i64, device_id: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            device_id: device_id.into(),
        }
    }
}

/// A pre-aggregated per-area metric: parallel millisecond epochs and values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeries {
    pub name: String,
    pub times_ms: Vec<i64>,
    pub values: Vec<f64>,
}

/// One named frame as delivered by the data source. The "docs" frame fills
/// `events`; every other frame fills `times_ms`/`values`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub name: String,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub times_ms: Vec<i64>,
    #[serde(default)]
    pub values: Vec<f64>,
}

/// Request body for a data update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameBatch {
    #[serde(default)]
    pub series: Vec<Frame>,
}

impl FrameBatch {
    /// Splits the batch into the raw events and the external series.
    /// Returns `None` when there is no "docs" frame: the caller treats that as "no data".
    pub fn split(self) -> Option<(Vec<Event>, Vec<NamedSeries>)> {
        let mut events = None;
        let mut external = Vec::new();
        for frame in self.series {
            if frame.name == DOCS_SERIES {
                if events.is_none() {
                    events = Some(frame.events);
                }
                continue;
            }
            external.push(NamedSeries {
                name: frame.name,
                times_ms: frame.times_ms,
                values: frame.values,
            });
        }
        events.map(|events| (events, external))
    }
}
