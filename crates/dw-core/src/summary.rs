//! Series-level summary: host load and thread counts over time.

use chrono::{DateTime, Utc};
use dw_common::{LockId, Snapshot, ThreadId};
use serde::Serialize;
use std::collections::HashSet;

/// Running-process count at one capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunningProcessesPoint {
    pub timestamp: DateTime<Utc>,
    pub running_processes: u32,
}

/// Thread and lock counts of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreadCountPoint {
    pub timestamp: DateTime<Utc>,
    pub threads: usize,
    pub locks: usize,
}

/// Running processes for every snapshot sampled with load averages.
///
/// Snapshots without load averages are skipped; a snapshot with load
/// averages but no running count reports 0.
pub fn running_processes(snapshots: &[Snapshot]) -> Vec<RunningProcessesPoint> {
    snapshots
        .iter()
        .filter(|s| s.load_averages.is_some())
        .map(|s| RunningProcessesPoint {
            timestamp: s.timestamp,
            running_processes: s.running_processes.unwrap_or(0),
        })
        .collect()
}

pub fn thread_counts(snapshots: &[Snapshot]) -> Vec<ThreadCountPoint> {
    snapshots
        .iter()
        .map(|s| ThreadCountPoint {
            timestamp: s.timestamp,
            threads: s.threads.len(),
            locks: s.locks.len(),
        })
        .collect()
}

/// True iff any snapshot lists at least one thread.
pub fn has_threads(snapshots: &[Snapshot]) -> bool {
    snapshots.iter().any(|s| !s.threads.is_empty())
}

/// Overview of a snapshot series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub dump_count: usize,
    pub first_capture: Option<DateTime<Utc>>,
    pub last_capture: Option<DateTime<Utc>>,
    pub distinct_threads: usize,
    pub distinct_locks: usize,
    pub has_threads: bool,
    pub running_processes: Vec<RunningProcessesPoint>,
    pub thread_counts: Vec<ThreadCountPoint>,
}

pub fn summarize(snapshots: &[Snapshot]) -> SeriesSummary {
    let distinct_threads: HashSet<ThreadId> = snapshots
        .iter()
        .flat_map(|s| s.threads.iter().map(|t| t.id))
        .collect();
    let distinct_locks: HashSet<&LockId> = snapshots
        .iter()
        .flat_map(|s| s.locks.iter().map(|l| &l.id))
        .collect();

    SeriesSummary {
        dump_count: snapshots.len(),
        first_capture: snapshots.first().map(|s| s.timestamp),
        last_capture: snapshots.last().map(|s| s.timestamp),
        distinct_threads: distinct_threads.len(),
        distinct_locks: distinct_locks.len(),
        has_threads: has_threads(snapshots),
        running_processes: running_processes(snapshots),
        thread_counts: thread_counts(snapshots),
    }
}
