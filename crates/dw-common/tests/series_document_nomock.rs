//! No-mock tests for the snapshot-series document format.
//!
//! Writes real JSON documents to disk and reads them back through serde,
//! the same path the CLI loader takes.

use dw_common::{LockId, LockRecord, Snapshot, SnapshotSeries, ThreadId, ThreadRecord};
use chrono::{TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

fn sample_series() -> SnapshotSeries {
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 10).unwrap();

    SnapshotSeries::new(vec![
        Snapshot::new(t0)
            .with_threads(vec![
                ThreadRecord::new(1, 40.0).with_name("http-nio-1").with_lock("0x1"),
                ThreadRecord::new(2, 0.5).with_stack(["java.lang.Object.wait"]),
            ])
            .with_locks(vec![LockRecord::new("0x1").with_owner(1).with_waiting([2])])
            .with_load([1.0, 0.8, 0.5], 3),
        Snapshot::new(t1).with_threads(vec![ThreadRecord::new(2, 1.5)]),
    ])
}

#[test]
fn series_survives_disk_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("series.json");

    let series = sample_series();
    fs::write(&path, serde_json::to_vec_pretty(&series).unwrap()).expect("write series");

    let raw = fs::read(&path).expect("read series");
    let loaded: SnapshotSeries = serde_json::from_slice(&raw).expect("parse series");

    assert_eq!(loaded, series);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.snapshots[0].locks[0].id, LockId::new("0x1"));
    assert_eq!(loaded.snapshots[0].locks[0].waiting, vec![ThreadId(2)]);
    assert_eq!(loaded.snapshots[0].running_processes, Some(3));
    assert!(loaded.snapshots[1].load_averages.is_none());
}

#[test]
fn optional_fields_are_omitted_when_absent() {
    let series = sample_series();
    let json = serde_json::to_string(&series.snapshots[1]).unwrap();
    assert!(!json.contains("running_processes"));
    assert!(!json.contains("load_averages"));
    assert!(!json.contains("lock_id"));
}

#[test]
fn unknown_mode_strings_are_rejected_at_parse_time() {
    let err = serde_json::from_str::<dw_common::CpuMode>("\"average-ish\"");
    assert!(err.is_err());
}
