// Bucketed index: 10-minute buckets -> device -> points, plus external metrics per bucket

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Bucket width in seconds. Fixed.
pub const BUCKET_WIDTH: i64 = 600;

/// Key label for the device count column in chart records.
pub const BY_DEVICE: &str = "By Device";

/// `[longitude, latitude]`, GeoJSON order.
pub type LonLat = [f64; 2];

/// Start second of the bucket containing `timestamp`.
/// Timestamps in the partial bucket at the bottom of the `i64` range map to the lowest
/// representable bucket start.
pub fn bucket_key(timestamp: i64) -> i64 {
    let n = timestamp.div_euclid(BUCKET_WIDTH);
    n.checked_mul(BUCKET_WIDTH).unwrap_or((n + 1) * BUCKET_WIDTH)
}

/// Points of one bucket, grouped by device id.
pub type DevicePoints = BTreeMap<String, Vec<LonLat>>;

/// Bucket -> device -> points. Built once per data update, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDeviceIndex {
    buckets: BTreeMap<i64, DevicePoints>,
}

impl PerDeviceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an empty bucket if not present. Existing devices are kept.
    pub fn ensure_bucket(&mut self, key: i64) -> &mut DevicePoints {
        self.buckets.entry(key).or_default()
    }

    pub fn push_point(&mut self, key: i64, device_id: &str, point: LonLat) {
        let devices = self.ensure_bucket(key);
        match devices.get_mut(device_id) {
            Some(points) => points.push(point),
            None => {
                devices.insert(device_id.to_string(), vec![point]);
            }
        }
    }

    pub fn bucket(&self, key: i64) -> Option<&DevicePoints> {
        self.buckets.get(&key)
    }

    /// Buckets in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &DevicePoints)> {
        self.buckets.iter().map(|(k, v)| (*k, v))
    }

    pub fn bucket_keys(&self) -> Vec<i64> {
        self.buckets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of points across all buckets and devices.
    pub fn point_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|devices| devices.values())
            .map(Vec::len)
            .sum()
    }
}

/// Metric name -> value for one bucket.
pub type MetricRow = BTreeMap<String, f64>;

/// Bucket key (seconds) -> external metrics. Values are merged into chart records verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalMetricTable {
    rows: BTreeMap<i64, MetricRow>,
}

impl ExternalMetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: i64, name: &str, value: f64) {
        self.rows
            .entry(key)
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn row(&self, key: i64) -> Option<&MetricRow> {
        self.rows.get(&key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<const N: usize> From<[(i64, MetricRow); N]> for ExternalMetricTable {
    fn from(rows: [(i64, MetricRow); N]) -> Self {
        Self {
            rows: BTreeMap::from(rows),
        }
    }
}

/// Heat-map point in Web Mercator metres (EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub x: f64,
    pub y: f64,
}

/// Everything one data update produces. Replaced wholesale on the next update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedFrame {
    pub per_device: PerDeviceIndex,
    pub per_area: ExternalMetricTable,
    /// Chart keys: "By Device" followed by the external series names.
    pub keys: Vec<String>,
    pub heat: Vec<HeatPoint>,
}
