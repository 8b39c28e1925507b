//! Thread correlation across snapshots.
//!
//! Groups every thread record in a snapshot series by its [`ThreadId`],
//! giving each thread one slot per snapshot index. A thread missing from a
//! snapshot (not started yet, already finished) leaves its slot empty; that
//! is ordinary data, not an error.

use dw_common::{Snapshot, ThreadId, ThreadRecord};
use std::collections::HashMap;

/// Per-snapshot view of one thread: `slots[i]` is its record in snapshot `i`.
pub type ThreadSlots<'a> = Vec<Option<&'a ThreadRecord>>;

/// Correlated threads, in order of first appearance in the series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadsOverTime<'a> {
    dump_count: usize,
    entries: Vec<(ThreadId, ThreadSlots<'a>)>,
}

impl<'a> ThreadsOverTime<'a> {
    /// Number of snapshots each slot vector spans.
    pub fn dump_count(&self) -> usize {
        self.dump_count
    }

    /// Number of distinct threads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots for one thread, if it appeared anywhere in the series.
    pub fn get(&self, id: ThreadId) -> Option<&[Option<&'a ThreadRecord>]> {
        self.entries
            .iter()
            .find(|(tid, _)| *tid == id)
            .map(|(_, slots)| slots.as_slice())
    }

    /// Iterate threads in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (ThreadId, &[Option<&'a ThreadRecord>])> + '_ {
        self.entries
            .iter()
            .map(|(id, slots)| (*id, slots.as_slice()))
    }

    /// Thread ids in first-appearance order.
    pub fn ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

impl<'a> IntoIterator for ThreadsOverTime<'a> {
    type Item = (ThreadId, ThreadSlots<'a>);
    type IntoIter = std::vec::IntoIter<(ThreadId, ThreadSlots<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Accumulates thread records while scanning a series.
///
/// Only [`Correlator::finish`] hands out the result, so no half-built
/// mapping is ever observable.
#[derive(Debug)]
pub struct Correlator<'a> {
    dump_count: usize,
    index: HashMap<ThreadId, usize>,
    entries: Vec<(ThreadId, ThreadSlots<'a>)>,
}

impl<'a> Correlator<'a> {
    pub fn new(dump_count: usize) -> Self {
        Correlator {
            dump_count,
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Record `thread` as seen in snapshot `snapshot_index`.
    ///
    /// A second record with the same id in the same snapshot replaces the
    /// first. Indices outside the series are ignored.
    pub fn observe(&mut self, snapshot_index: usize, thread: &'a ThreadRecord) {
        if snapshot_index >= self.dump_count {
            tracing::warn!(
                snapshot_index,
                dump_count = self.dump_count,
                "ignoring thread observation outside the series"
            );
            return;
        }
        let slot = match self.index.get(&thread.id) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.entries.push((thread.id, vec![None; self.dump_count]));
                self.index.insert(thread.id, pos);
                pos
            }
        };
        self.entries[slot].1[snapshot_index] = Some(thread);
    }

    pub fn finish(self) -> ThreadsOverTime<'a> {
        ThreadsOverTime {
            dump_count: self.dump_count,
            entries: self.entries,
        }
    }
}

/// Correlate every thread in `snapshots` by id.
///
/// Each resulting slot vector has exactly `snapshots.len()` entries, in
/// snapshot order. An empty series yields an empty mapping.
pub fn correlate(snapshots: &[Snapshot]) -> ThreadsOverTime<'_> {
    let mut correlator = Correlator::new(snapshots.len());
    for (i, snapshot) in snapshots.iter().enumerate() {
        for thread in &snapshot.threads {
            correlator.observe(i, thread);
        }
    }
    let threads = correlator.finish();
    tracing::debug!(
        dumps = threads.dump_count(),
        threads = threads.len(),
        "correlated threads across snapshots"
    );
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{snapshot_at, thread};

    #[test]
    fn empty_series_is_empty_mapping() {
        let threads = correlate(&[]);
        assert!(threads.is_empty());
        assert_eq!(threads.dump_count(), 0);
    }

    #[test]
    fn slots_span_whole_series() {
        let snapshots = vec![
            snapshot_at(0).with_threads(vec![thread(1, 1.0), thread(2, 2.0)]),
            snapshot_at(1).with_threads(vec![thread(2, 3.0)]),
            snapshot_at(2).with_threads(vec![thread(3, 4.0)]),
        ];
        let threads = correlate(&snapshots);

        assert_eq!(threads.len(), 3);
        for (_, slots) in threads.iter() {
            assert_eq!(slots.len(), 3);
        }

        let t2 = threads.get(ThreadId(2)).unwrap();
        assert_eq!(t2[0].map(|t| t.cpu_usage), Some(2.0));
        assert_eq!(t2[1].map(|t| t.cpu_usage), Some(3.0));
        assert!(t2[2].is_none());

        let t3 = threads.get(ThreadId(3)).unwrap();
        assert!(t3[0].is_none() && t3[1].is_none());
        assert!(t3[2].is_some());
    }

    #[test]
    fn first_appearance_order_is_kept() {
        let snapshots = vec![
            snapshot_at(0).with_threads(vec![thread(9, 0.0), thread(4, 0.0)]),
            snapshot_at(1).with_threads(vec![thread(1, 0.0), thread(9, 0.0)]),
        ];
        let ids: Vec<_> = correlate(&snapshots).ids().collect();
        assert_eq!(ids, vec![ThreadId(9), ThreadId(4), ThreadId(1)]);
    }

    #[test]
    fn duplicate_id_in_one_snapshot_overwrites() {
        let snapshots =
            vec![snapshot_at(0).with_threads(vec![thread(1, 1.0), thread(1, 5.0)])];
        let threads = correlate(&snapshots);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads.get(ThreadId(1)).unwrap()[0].unwrap().cpu_usage, 5.0);
    }

    #[test]
    fn out_of_range_observation_is_ignored() {
        let record = thread(1, 1.0);
        let mut correlator = Correlator::new(1);
        correlator.observe(3, &record);
        assert!(correlator.finish().is_empty());
    }
}
