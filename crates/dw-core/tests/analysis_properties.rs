//! Property-based tests for correlation, ranking and monitor invariants.

use dw_common::{CpuMode, LockRecord, Snapshot, ThreadRecord};
use dw_core::contention::{has_any_owner, MonitorFilter, QueueHeuristic};
use dw_core::correlate::correlate;
use dw_core::cpu::rank_consumers;
use dw_core::monitors::build;
use dw_core::test_utils::snapshot_at;
use proptest::prelude::*;

/// One generated snapshot: (thread id, cpu, stack depth) triples and
/// (lock index, owner, waiters) triples over a small id space so that
/// threads and locks recur across dumps.
type RawSnapshot = (Vec<(u64, f64, usize)>, Vec<(u8, Option<u64>, Vec<u64>)>);

fn raw_snapshot() -> impl Strategy<Value = RawSnapshot> {
    (
        prop::collection::vec((0u64..12, 0.0f64..100.0, 0usize..20), 0..8),
        prop::collection::vec(
            (
                0u8..4,
                prop::option::of(0u64..12),
                prop::collection::vec(0u64..12, 0..4),
            ),
            0..4,
        ),
    )
}

fn materialize(raw: &[RawSnapshot]) -> Vec<Snapshot> {
    raw.iter()
        .enumerate()
        .map(|(i, (threads, locks))| {
            let threads = threads
                .iter()
                .map(|&(id, cpu, depth)| {
                    ThreadRecord::new(id, cpu).with_stack((0..depth).map(|f| format!("f{}", f)))
                })
                .collect();
            // At most one record per lock per snapshot.
            let mut seen = Vec::new();
            let locks = locks
                .iter()
                .filter(|(idx, _, _)| {
                    let fresh = !seen.contains(idx);
                    seen.push(*idx);
                    fresh
                })
                .map(|(idx, owner, waiting)| {
                    let record = LockRecord::new(format!("lock-{}", idx))
                        .with_waiting(waiting.iter().copied());
                    match owner {
                        Some(owner) => record.with_owner(*owner),
                        None => record,
                    }
                })
                .collect();
            snapshot_at(i as i64).with_threads(threads).with_locks(locks)
        })
        .collect()
}

fn series() -> impl Strategy<Value = Vec<Snapshot>> {
    prop::collection::vec(raw_snapshot(), 0..6).prop_map(|raw| materialize(&raw))
}

fn any_mode() -> impl Strategy<Value = CpuMode> {
    prop::sample::select(CpuMode::ALL.to_vec())
}

proptest! {
    #[test]
    fn correlated_slots_match_dump_count(snapshots in series()) {
        let threads = correlate(&snapshots);
        prop_assert_eq!(threads.dump_count(), snapshots.len());
        for (_, slots) in threads.iter() {
            prop_assert_eq!(slots.len(), snapshots.len());
        }
    }

    #[test]
    fn ranking_is_non_increasing(snapshots in series(), mode in any_mode()) {
        let consumers = rank_consumers(&snapshots, mode);
        for pair in consumers.windows(2) {
            prop_assert!(pair[0].calculated_value >= pair[1].calculated_value);
        }
    }

    #[test]
    fn aggregate_bounded_by_peak(snapshots in series(), mode in any_mode()) {
        for consumer in rank_consumers(&snapshots, mode) {
            let peak = consumer.samples().into_iter().fold(0.0f64, f64::max);
            prop_assert!(consumer.calculated_value >= 0.0);
            prop_assert!(consumer.calculated_value <= peak + 1e-9);
        }
    }

    #[test]
    fn waiting_sum_matches_waiting_triples(snapshots in series()) {
        let monitors = build(&snapshots);
        let expected: usize = snapshots
            .iter()
            .flat_map(|s| s.locks.iter())
            .map(|l| l.waiting.len())
            .sum();
        let total: usize = monitors.iter().map(|m| m.waiting_sum()).sum();
        prop_assert_eq!(total, expected);
        for pair in monitors.windows(2) {
            prop_assert!(pair[0].waiting_sum() >= pair[1].waiting_sum());
        }
    }

    #[test]
    fn filters_only_narrow(snapshots in series(), depth in 1usize..20) {
        let monitors = build(&snapshots);
        let heuristic = QueueHeuristic::new(depth);
        let base = MonitorFilter { heuristic, ..MonitorFilter::all() };
        let everything = base.apply(&monitors).len();

        let idle = MonitorFilter { without_idle: true, ..base }.apply(&monitors);
        prop_assert!(idle.len() <= everything);
        prop_assert!(idle.iter().all(|m| !heuristic.is_queue_thread(m)));

        let owned = MonitorFilter { with_owner: true, ..base }.apply(&monitors);
        let ownerless = MonitorFilter { without_owner: true, ..base }.apply(&monitors);
        prop_assert!(owned.iter().all(|m| has_any_owner(m)));
        prop_assert!(ownerless.iter().all(|m| !has_any_owner(m)));
        prop_assert_eq!(owned.len() + ownerless.len(), everything);
    }

    #[test]
    fn analyses_are_repeatable(snapshots in series(), mode in any_mode()) {
        prop_assert_eq!(rank_consumers(&snapshots, mode), rank_consumers(&snapshots, mode));
        prop_assert_eq!(build(&snapshots), build(&snapshots));
    }
}
