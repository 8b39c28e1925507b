//! Structured fuzz target for the analysis invariants.
//!
//! Builds snapshot series from arbitrary thread/lock layouts and asserts the
//! ranking and waiting-sum invariants hold.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{DateTime, Duration};
use dw_common::{CpuMode, LockRecord, Snapshot, ThreadRecord};
use dw_core::contention::{MonitorFilter, QueueHeuristic};
use dw_core::correlate::correlate;
use dw_core::cpu::rank_consumers;
use dw_core::monitors::build;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzThread {
    id: u8,
    cpu: u16,
    depth: u8,
}

#[derive(Debug, Arbitrary)]
struct FuzzLock {
    id: u8,
    owner: Option<u8>,
    waiting: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct FuzzSnapshot {
    threads: Vec<FuzzThread>,
    locks: Vec<FuzzLock>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    snapshots: Vec<FuzzSnapshot>,
    queue_depth: u8,
    with_owner: bool,
    without_idle: bool,
    without_owner: bool,
}

fn to_series(input: &FuzzInput) -> Vec<Snapshot> {
    input
        .snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let threads = s
                .threads
                .iter()
                .map(|t| {
                    ThreadRecord::new(u64::from(t.id), f64::from(t.cpu) / 10.0)
                        .with_stack((0..t.depth % 32).map(|f| format!("f{}", f)))
                })
                .collect();
            let mut locks: Vec<LockRecord> = Vec::new();
            for l in &s.locks {
                let id = format!("0x{:02x}", l.id % 8);
                if locks.iter().any(|existing| existing.id.as_str() == id) {
                    continue;
                }
                let record = LockRecord::new(id).with_waiting(l.waiting.iter().map(|w| u64::from(*w)));
                locks.push(match l.owner {
                    Some(owner) => record.with_owner(u64::from(owner)),
                    None => record,
                });
            }
            Snapshot::new(DateTime::UNIX_EPOCH + Duration::seconds(i as i64))
                .with_threads(threads)
                .with_locks(locks)
        })
        .collect()
}

fuzz_target!(|input: FuzzInput| {
    let snapshots = to_series(&input);

    let threads = correlate(&snapshots);
    for (_, slots) in threads.iter() {
        assert_eq!(slots.len(), snapshots.len());
    }

    for mode in CpuMode::ALL {
        let consumers = rank_consumers(&snapshots, mode);
        for pair in consumers.windows(2) {
            assert!(pair[0].calculated_value >= pair[1].calculated_value);
        }
    }

    let monitors = build(&snapshots);
    let expected: usize = snapshots.iter().flat_map(|s| &s.locks).map(|l| l.waiting.len()).sum();
    let total: usize = monitors.iter().map(|m| m.waiting_sum()).sum();
    assert_eq!(total, expected);

    let filter = MonitorFilter {
        with_owner: input.with_owner,
        without_idle: input.without_idle,
        without_owner: input.without_owner,
        heuristic: QueueHeuristic::new(usize::from(input.queue_depth)),
    };
    assert!(filter.apply(&monitors).iter().all(|m| m.waiting_sum() > 0));
});
