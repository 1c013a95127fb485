// Polygon query: per bucket, count devices with at least one point inside the polygon,
// merge external metrics, keep the most recent buckets. Pure; no state across calls.

pub mod containment;

pub use containment::{Containment, PlanarPolygon};

use crate::models::{
    ChartRecord, DevicePoints, ExternalMetricTable, LonLat, PerDeviceIndex, QueryResult,
};

/// Number of most recent buckets returned by a query.
pub const CHART_WINDOW: usize = 18;

/// Devices with at least one point inside `area`. Each device counts once.
pub fn count_devices<C: Containment + ?Sized>(area: &C, devices: &DevicePoints) -> u64 {
    devices
        .values()
        .filter(|points| points.iter().any(|&p| area.contains(p)))
        .count() as u64
}

/// Runs the query against any containment implementation.
pub fn query_with<C: Containment + ?Sized>(
    area: &C,
    per_device: &PerDeviceIndex,
    per_area: &ExternalMetricTable,
) -> QueryResult {
    let skip = per_device.len().saturating_sub(CHART_WINDOW);
    per_device
        .iter()
        .skip(skip)
        .map(|(timestamp, devices)| ChartRecord {
            timestamp,
            by_device: count_devices(area, devices),
            metrics: per_area.row(timestamp).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Counts devices inside the planar polygon `ring` for the most recent buckets.
pub fn query(
    ring: &[LonLat],
    per_device: &PerDeviceIndex,
    per_area: &ExternalMetricTable,
) -> QueryResult {
    query_with(&PlanarPolygon::from_ring(ring), per_device, per_area)
}
