//! Fixture builders shared by unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dw_common::{LockRecord, Snapshot, ThreadRecord};

/// Capture time of the first fixture snapshot.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Empty snapshot captured `index * 10` seconds after [`base_time`].
pub fn snapshot_at(index: i64) -> Snapshot {
    Snapshot::new(base_time() + Duration::seconds(index * 10))
}

/// Thread with a CPU sample and no stack.
pub fn thread(id: u64, cpu_usage: f64) -> ThreadRecord {
    ThreadRecord::new(id, cpu_usage).with_name(format!("thread-{}", id))
}

/// Thread whose stack has exactly `depth` frames.
pub fn thread_with_depth(id: u64, depth: usize) -> ThreadRecord {
    thread(id, 0.0).with_stack((0..depth).map(|i| format!("frame{}", i)))
}

/// Lock with an optional owner and a list of waiters.
pub fn lock(id: &str, owner: Option<u64>, waiting: &[u64]) -> LockRecord {
    let record = LockRecord::new(id).with_waiting(waiting.iter().copied());
    match owner {
        Some(owner) => record.with_owner(owner),
        None => record,
    }
}
