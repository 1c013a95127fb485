// Bucketizer: raw pings (newest-first) -> 10-minute buckets -> device -> points.
// Pure; runs once per data update. The result is replaced wholesale on the next update.

use tracing::{debug, warn};

use crate::models::{
    BUCKET_WIDTH, BY_DEVICE, BucketedFrame, Event, ExternalMetricTable, NamedSeries,
    PerDeviceIndex, bucket_key,
};
use crate::projection;

/// Bucket keys strictly between `prev` and `next`, ascending.
/// Empty when the buckets are identical, adjacent, or `next` is not ahead of `prev`.
/// `prev` in the last bucket of the `i64` range has no successor, so nothing is filled.
pub fn fill_gaps_between(prev: i64, next: i64) -> Vec<i64> {
    let Some(first) = prev.checked_add(BUCKET_WIDTH) else {
        return Vec::new();
    };
    if next <= first {
        return Vec::new();
    }
    (first..next)
        .step_by(BUCKET_WIDTH as usize)
        .collect()
}

/// Fold state: last bucket key seen (None until the first event) and the index so far.
struct Acc {
    last_key: Option<i64>,
    index: PerDeviceIndex,
}

fn step(acc: Acc, event: &Event) -> Acc {
    let Acc {
        last_key,
        mut index,
    } = acc;
    let key = bucket_key(event.timestamp);

    let last_key = match last_key {
        None => key,
        Some(prev) => match prev.checked_add(BUCKET_WIDTH) {
            Some(adjacent) if key > adjacent => {
                for gap in fill_gaps_between(prev, key) {
                    index.ensure_bucket(gap);
                }
                key
            }
            Some(adjacent) if key == adjacent => key,
            // Same bucket, an out-of-order event behind the running key,
            // or `prev` is already the last bucket of the range.
            _ => prev,
        },
    };

    index.push_point(key, &event.device_id, [event.longitude, event.latitude]);
    Acc {
        last_key: Some(last_key),
        index,
    }
}

/// Builds the per-device index from a newest-first event feed.
/// Buckets between the first and last observed bucket are always present, possibly empty.
pub fn build_index(events: &[Event]) -> PerDeviceIndex {
    let acc = events.iter().rev().fold(
        Acc {
            last_key: None,
            index: PerDeviceIndex::new(),
        },
        step,
    );
    acc.index
}

/// Chart record fields an external series may not shadow.
const RESERVED_NAMES: [&str; 2] = ["timestamp", BY_DEVICE];

fn usable(series: &[NamedSeries]) -> impl Iterator<Item = &NamedSeries> {
    series
        .iter()
        .filter(|s| !RESERVED_NAMES.contains(&s.name.as_str()))
}

/// Builds the external metric table. The first series' time axis drives the rows;
/// each row is keyed by the sample's epoch second. Series lacking a sample at an index are skipped.
/// Series named like a chart record field ("timestamp", "By Device") are ignored.
pub fn build_metric_table(series: &[NamedSeries]) -> ExternalMetricTable {
    let mut table = ExternalMetricTable::new();
    for s in series.iter().filter(|s| RESERVED_NAMES.contains(&s.name.as_str())) {
        warn!(series = %s.name, "external series name collides with a chart field; ignored");
    }
    let Some(first) = usable(series).next() else {
        return table;
    };
    for (i, &time_ms) in first.times_ms.iter().enumerate() {
        let key = time_ms.div_euclid(1000);
        for s in usable(series) {
            if let Some(&value) = s.values.get(i) {
                table.insert(key, &s.name, value);
            }
        }
    }
    table
}

/// Chart keys: "By Device" then the external series names in input order.
pub fn key_labels(series: &[NamedSeries]) -> Vec<String> {
    std::iter::once(BY_DEVICE.to_string())
        .chain(usable(series).map(|s| s.name.clone()))
        .collect()
}

/// Bucketizes one data update. `events` is the "docs" frame, newest-first;
/// callers must not invoke this without one (missing docs means "no data").
pub fn bucketize(events: &[Event], external: &[NamedSeries]) -> BucketedFrame {
    let per_device = build_index(events);
    let per_area = build_metric_table(external);
    let heat = events
        .iter()
        .map(|e| projection::to_web_mercator(e.longitude, e.latitude))
        .collect();

    debug!(
        events = events.len(),
        buckets = per_device.len(),
        external_series = external.len(),
        metric_rows = per_area.len(),
        "bucketized frame"
    );

    BucketedFrame {
        per_device,
        per_area,
        keys: key_labels(external),
        heat,
    }
}
