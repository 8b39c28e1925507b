//! Lock (monitor) aggregation across snapshots.
//!
//! Every [`LockRecord`] of every snapshot becomes a [`Monitor`], with the
//! owner and waiter ids resolved against the threads of that same
//! snapshot. Monitors sharing a lock id are collected into one
//! [`MonitorOverTime`], which keeps a running count of waiting threads.

use chrono::{DateTime, Utc};
use dw_common::{LockId, LockRecord, Snapshot, ThreadId, ThreadRecord};
use serde::Serialize;
use std::collections::HashMap;

/// A thread blocked on a lock.
///
/// `thread` is `None` when the dump references an id that is missing from
/// the snapshot's thread list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waiter<'a> {
    pub thread_id: ThreadId,
    pub thread: Option<&'a ThreadRecord>,
}

impl<'a> Waiter<'a> {
    /// Stack depth of the resolved thread.
    pub fn stack_depth(&self) -> Option<usize> {
        self.thread.map(ThreadRecord::stack_depth)
    }
}

/// One lock as observed in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Monitor<'a> {
    pub id: &'a LockId,
    pub snapshot_index: usize,
    pub timestamp: DateTime<Utc>,
    /// Owner id as written in the dump, resolved or not.
    pub owner_id: Option<ThreadId>,
    /// Resolved owner; an unresolved owner counts as no owner.
    pub owner: Option<&'a ThreadRecord>,
    pub waiting: Vec<Waiter<'a>>,
}

impl<'a> Monitor<'a> {
    /// Resolve `lock` against `threads`, the thread index of `snapshot`.
    pub fn resolve(
        snapshot_index: usize,
        snapshot: &'a Snapshot,
        threads: &HashMap<ThreadId, &'a ThreadRecord>,
        lock: &'a LockRecord,
    ) -> Self {
        let owner = lock.owner.and_then(|id| {
            let found = threads.get(&id).copied();
            if found.is_none() {
                tracing::debug!(lock = %lock.id, thread = %id, snapshot_index, "unresolved lock owner");
            }
            found
        });

        let waiting = lock
            .waiting
            .iter()
            .map(|&thread_id| {
                let thread = threads.get(&thread_id).copied();
                if thread.is_none() {
                    tracing::debug!(lock = %lock.id, thread = %thread_id, snapshot_index, "unresolved lock waiter");
                }
                Waiter { thread_id, thread }
            })
            .collect();

        Monitor {
            id: &lock.id,
            snapshot_index,
            timestamp: snapshot.timestamp,
            owner_id: lock.owner,
            owner,
            waiting,
        }
    }

    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }
}

/// All observations of one lock across the series.
///
/// `waiting_sum` always equals the total number of waiters over
/// `monitors`; both only change through [`MonitorOverTime::push`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorOverTime<'a> {
    id: &'a LockId,
    monitors: Vec<Monitor<'a>>,
    waiting_sum: usize,
}

impl<'a> MonitorOverTime<'a> {
    pub fn new(id: &'a LockId) -> Self {
        MonitorOverTime {
            id,
            monitors: Vec::new(),
            waiting_sum: 0,
        }
    }

    /// Append an observation of this lock.
    ///
    /// Observations of other locks are rejected and returned.
    pub fn push(&mut self, monitor: Monitor<'a>) -> Result<(), Monitor<'a>> {
        if monitor.id != self.id {
            return Err(monitor);
        }
        self.waiting_sum += monitor.waiting.len();
        self.monitors.push(monitor);
        Ok(())
    }

    pub fn id(&self) -> &'a LockId {
        self.id
    }

    pub fn monitors(&self) -> &[Monitor<'a>] {
        &self.monitors
    }

    pub fn waiting_sum(&self) -> usize {
        self.waiting_sum
    }
}

/// Build per-lock aggregates for a whole series.
///
/// Sorted by `waiting_sum` descending, ties in first-appearance order.
/// Locks nobody ever waited on are kept; filtering is the caller's job.
pub fn build(snapshots: &[Snapshot]) -> Vec<MonitorOverTime<'_>> {
    let mut index: HashMap<&LockId, usize> = HashMap::new();
    let mut series: Vec<MonitorOverTime<'_>> = Vec::new();

    for (snapshot_index, snapshot) in snapshots.iter().enumerate() {
        let threads: HashMap<ThreadId, &ThreadRecord> =
            snapshot.threads.iter().map(|t| (t.id, t)).collect();

        for lock in &snapshot.locks {
            let monitor = Monitor::resolve(snapshot_index, snapshot, &threads, lock);
            let pos = *index.entry(&lock.id).or_insert_with(|| {
                series.push(MonitorOverTime::new(&lock.id));
                series.len() - 1
            });
            let pushed = series[pos].push(monitor);
            debug_assert!(pushed.is_ok(), "lock index out of sync with series");
        }
    }

    series.sort_by(|a, b| b.waiting_sum.cmp(&a.waiting_sum));

    tracing::debug!(
        dumps = snapshots.len(),
        locks = series.len(),
        "built monitors over time"
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{lock, snapshot_at, thread};

    #[test]
    fn groups_by_lock_id_and_sums_waiters() {
        let snapshots = vec![
            snapshot_at(0)
                .with_threads(vec![thread(1, 0.0), thread(2, 0.0), thread(3, 0.0)])
                .with_locks(vec![lock("a", Some(1), &[2, 3]), lock("b", None, &[])]),
            snapshot_at(1)
                .with_threads(vec![thread(1, 0.0), thread(2, 0.0)])
                .with_locks(vec![lock("a", None, &[2])]),
        ];
        let monitors = build(&snapshots);

        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].id().as_str(), "a");
        assert_eq!(monitors[0].waiting_sum(), 3);
        assert_eq!(monitors[0].monitors().len(), 2);
        assert_eq!(monitors[0].monitors()[1].snapshot_index, 1);
        assert_eq!(monitors[1].id().as_str(), "b");
        assert_eq!(monitors[1].waiting_sum(), 0);
    }

    #[test]
    fn resolves_owner_and_waiters_from_same_snapshot() {
        let snapshots = vec![snapshot_at(0)
            .with_threads(vec![thread(1, 7.0), thread(2, 0.0).with_stack(["x", "y"])])
            .with_locks(vec![lock("a", Some(1), &[2])])];
        let monitors = build(&snapshots);
        let m = &monitors[0].monitors()[0];
        assert_eq!(m.owner.map(|t| t.cpu_usage), Some(7.0));
        assert_eq!(m.waiting[0].stack_depth(), Some(2));
    }

    #[test]
    fn unresolved_references_are_not_fatal() {
        let snapshots = vec![snapshot_at(0)
            .with_threads(vec![thread(1, 0.0)])
            .with_locks(vec![lock("a", Some(99), &[1, 42])])];
        let monitors = build(&snapshots);
        let m = &monitors[0].monitors()[0];

        assert_eq!(m.owner_id, Some(ThreadId(99)));
        assert!(m.owner.is_none());
        assert!(!m.has_owner());
        assert_eq!(m.waiting.len(), 2);
        assert!(m.waiting[1].thread.is_none());
        assert_eq!(monitors[0].waiting_sum(), 2);
    }

    #[test]
    fn sorted_by_waiting_sum_stable_on_ties() {
        let snapshots = vec![snapshot_at(0)
            .with_threads(vec![thread(1, 0.0), thread(2, 0.0)])
            .with_locks(vec![
                lock("x", None, &[1]),
                lock("y", None, &[1, 2]),
                lock("z", None, &[2]),
            ])];
        let ids: Vec<&str> = build(&snapshots).iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, vec!["y", "x", "z"]);
    }

    #[test]
    fn push_rejects_foreign_lock() {
        let snapshots = vec![snapshot_at(0).with_locks(vec![lock("a", None, &[1])])];
        let threads = HashMap::new();
        let monitor = Monitor::resolve(0, &snapshots[0], &threads, &snapshots[0].locks[0]);

        let other = LockId::new("b");
        let mut series = MonitorOverTime::new(&other);
        assert!(series.push(monitor).is_err());
        assert_eq!(series.waiting_sum(), 0);
    }

    #[test]
    fn every_observation_lands_on_its_lock() {
        let snapshots: Vec<Snapshot> = (0..4)
            .map(|i| {
                snapshot_at(i).with_locks(vec![
                    lock("a", None, &[1]),
                    lock("b", None, &[1, 2]),
                    lock("c", None, &[]),
                ])
            })
            .collect();
        let monitors = build(&snapshots);

        assert_eq!(monitors.len(), 3);
        for m in &monitors {
            assert_eq!(m.monitors().len(), 4);
            assert!(m.monitors().iter().all(|obs| obs.id == m.id()));
        }
        let sums: Vec<(&str, usize)> =
            monitors.iter().map(|m| (m.id().as_str(), m.waiting_sum())).collect();
        assert_eq!(sums, vec![("b", 8), ("a", 4), ("c", 0)]);
    }

    #[test]
    fn empty_series_builds_nothing() {
        assert!(build(&[]).is_empty());
    }
}
