// Bucketizer tests: bucket keys, gap filling, per-device point sets, external metric table

mod common;

use common::*;
use heatfence::bucketizer::{build_index, build_metric_table, bucketize, key_labels};
use heatfence::models::*;

#[test]
fn bucket_key_floors_to_ten_minutes() {
    assert_eq!(bucket_key(0), 0);
    assert_eq!(bucket_key(599), 0);
    assert_eq!(bucket_key(600), 600);
    assert_eq!(bucket_key(1_700_000_123), 1_699_999_800);
    assert_eq!(bucket_key(-1), -600);
}

#[test]
fn bucket_key_handles_extreme_timestamps() {
    let top = bucket_key(i64::MAX);
    assert_eq!(top % BUCKET_WIDTH, 0);
    assert!(i64::MAX - top < BUCKET_WIDTH);
    let bottom = bucket_key(i64::MIN);
    assert_eq!(bottom % BUCKET_WIDTH, 0);
    assert!(bottom - i64::MIN <= BUCKET_WIDTH);
}

#[test]
fn events_in_last_bucket_of_range_do_not_overflow() {
    let top = bucket_key(i64::MAX);
    let events = newest_first(vec![
        ev(0.0, 0.0, i64::MAX, "a"),
        ev(0.0, 0.0, i64::MAX - 1, "b"),
        ev(0.0, 0.0, top - 2 * BUCKET_WIDTH, "c"),
    ]);
    let index = build_index(&events);
    assert_eq!(
        index.bucket_keys(),
        vec![top - 2 * BUCKET_WIDTH, top - BUCKET_WIDTH, top]
    );
    assert_eq!(index.bucket(top).unwrap().len(), 2);
}

#[test]
fn minimum_timestamp_from_json_is_bucketized() {
    let json = r#"{ "series": [ { "name": "docs", "events": [
        { "latitude": 0.5, "longitude": 0.5, "timestamp": -9223372036854775808, "device_id": "a" }
    ] } ] }"#;
    let b: FrameBatch = serde_json::from_str(json).unwrap();
    let (events, external) = b.split().unwrap();
    let frame = bucketize(&events, &external);
    assert_eq!(frame.per_device.bucket_keys(), vec![bucket_key(i64::MIN)]);
    assert_eq!(frame.per_device.point_count(), 1);
}

#[test]
fn every_event_lands_in_exactly_one_bucket() {
    let events = newest_first(vec![
        ev(1.0, 1.0, 610, "a"),
        ev(2.0, 2.0, 1190, "a"),
        ev(3.0, 3.0, 1200, "b"),
        ev(4.0, 4.0, 1799, "b"),
    ]);
    let index = build_index(&events);
    assert_eq!(index.point_count(), events.len());
    assert_eq!(index.bucket_keys(), vec![600, 1200]);
    assert_eq!(index.bucket(600).unwrap()["a"], vec![[1.0, 1.0], [2.0, 2.0]]);
    assert_eq!(index.bucket(1200).unwrap()["b"], vec![[3.0, 3.0], [4.0, 4.0]]);
}

#[test]
fn gap_between_distant_buckets_is_filled_with_empty_buckets() {
    let events = newest_first(vec![ev(0.0, 0.0, 0, "a"), ev(0.0, 0.0, 1800, "a")]);
    let index = build_index(&events);
    assert_eq!(index.bucket_keys(), vec![0, 600, 1200, 1800]);
    assert!(index.bucket(600).unwrap().is_empty());
    assert!(index.bucket(1200).unwrap().is_empty());
    assert_eq!(index.bucket(0).unwrap()["a"].len(), 1);
    assert_eq!(index.bucket(1800).unwrap()["a"].len(), 1);
}

#[test]
fn adjacent_buckets_need_no_filling() {
    let events = newest_first(vec![ev(0.0, 0.0, 6000, "a"), ev(0.0, 0.0, 6600, "b")]);
    let index = build_index(&events);
    assert_eq!(index.bucket_keys(), vec![6000, 6600]);
}

#[test]
fn no_buckets_before_first_or_after_last_event() {
    let events = newest_first(vec![ev(0.0, 0.0, 60_000, "a"), ev(0.0, 0.0, 61_800, "a")]);
    let index = build_index(&events);
    assert_eq!(index.bucket_keys().first(), Some(&60_000));
    assert_eq!(index.bucket_keys().last(), Some(&61_800));
    assert_eq!(index.len(), 4);
}

#[test]
fn feed_is_processed_oldest_first() {
    // Newest-first input: the later bucket comes first in the slice.
    let events = vec![ev(0.0, 0.0, 3000, "a"), ev(0.0, 0.0, 600, "a")];
    let index = build_index(&events);
    assert_eq!(index.bucket_keys(), vec![600, 1200, 1800, 2400, 3000]);
}

#[test]
fn late_event_goes_to_its_own_bucket_without_moving_the_running_key() {
    // Oldest-first after reversal: 1800, 600, 2400. The 600 event is behind the running key.
    let events = vec![
        ev(0.0, 0.0, 2410, "c"),
        ev(0.0, 0.0, 610, "b"),
        ev(0.0, 0.0, 1810, "a"),
    ];
    let index = build_index(&events);
    // 2400 is adjacent to 1800, so no gap is filled after the late event.
    assert_eq!(index.bucket_keys(), vec![600, 1800, 2400]);
    assert_eq!(index.bucket(600).unwrap()["b"], vec![[0.0, 0.0]]);
    assert!(index.bucket(1200).is_none());
}

#[test]
fn repeated_points_for_one_device_are_kept() {
    let events = newest_first(vec![
        ev(0.1, 0.1, 600, "a"),
        ev(0.2, 0.2, 650, "a"),
        ev(0.1, 0.1, 700, "a"),
    ]);
    let index = build_index(&events);
    assert_eq!(index.bucket(600).unwrap()["a"].len(), 3);
}

#[test]
fn empty_feed_gives_empty_index() {
    let frame = bucketize(&[], &[]);
    assert!(frame.per_device.is_empty());
    assert!(frame.per_area.is_empty());
    assert!(frame.heat.is_empty());
    assert_eq!(frame.keys, vec![BY_DEVICE.to_string()]);
}

#[test]
fn heat_has_one_point_per_event() {
    let events = newest_first(vec![ev(106.8, -6.2, 600, "a"), ev(106.8, -6.2, 610, "a")]);
    let frame = bucketize(&events, &[]);
    assert_eq!(frame.heat.len(), 2);
    assert!(frame.heat[0].x > 1.1e7);
    assert!(frame.heat[0].y < 0.0);
}

#[test]
fn metric_table_keys_by_epoch_seconds() {
    let series = vec![
        NamedSeries {
            name: "ZoneA".into(),
            times_ms: vec![600_000, 1_200_000],
            values: vec![7.0, 9.0],
        },
        NamedSeries {
            name: "ZoneB".into(),
            times_ms: vec![600_000, 1_200_000],
            values: vec![1.0, 2.0],
        },
    ];
    let table = build_metric_table(&series);
    assert_eq!(table.len(), 2);
    assert_eq!(table.row(600).unwrap()["ZoneA"], 7.0);
    assert_eq!(table.row(600).unwrap()["ZoneB"], 1.0);
    assert_eq!(table.row(1200).unwrap()["ZoneA"], 9.0);
    assert!(table.row(1800).is_none());
    assert_eq!(
        key_labels(&series),
        vec!["By Device".to_string(), "ZoneA".into(), "ZoneB".into()]
    );
}

#[test]
fn shorter_external_series_skips_missing_samples() {
    let series = vec![
        NamedSeries {
            name: "ZoneA".into(),
            times_ms: vec![600_000, 1_200_000],
            values: vec![7.0, 9.0],
        },
        NamedSeries {
            name: "ZoneB".into(),
            times_ms: vec![600_000],
            values: vec![1.0],
        },
    ];
    let table = build_metric_table(&series);
    assert_eq!(table.row(1200).unwrap().len(), 1);
    assert!(!table.row(1200).unwrap().contains_key("ZoneB"));
}

#[test]
fn series_named_like_chart_fields_are_ignored() {
    let series = vec![
        NamedSeries {
            name: "timestamp".into(),
            times_ms: vec![1_200_000],
            values: vec![5.0],
        },
        NamedSeries {
            name: "ZoneA".into(),
            times_ms: vec![600_000],
            values: vec![7.0],
        },
        NamedSeries {
            name: BY_DEVICE.into(),
            times_ms: vec![600_000],
            values: vec![9.0],
        },
    ];
    let table = build_metric_table(&series);
    assert_eq!(table.len(), 1);
    assert_eq!(table.row(600).unwrap().len(), 1);
    assert_eq!(table.row(600).unwrap()["ZoneA"], 7.0);
    assert_eq!(
        key_labels(&series),
        vec![BY_DEVICE.to_string(), "ZoneA".into()]
    );
}

#[test]
fn frame_batch_without_docs_is_no_data() {
    let b = batch(vec![metric_frame("ZoneA", vec![600_000], vec![1.0])]);
    assert!(b.split().is_none());
}

#[test]
fn frame_batch_separates_docs_from_external_series() {
    let b = batch(vec![
        metric_frame("ZoneA", vec![600_000], vec![1.0]),
        docs_frame(vec![ev(0.0, 0.0, 600, "a")]),
    ]);
    let (events, external) = b.split().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(external.len(), 1);
    assert_eq!(external[0].name, "ZoneA");
}
