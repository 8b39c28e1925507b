//! CPU consumer ranking.
//!
//! Reduces each correlated thread's per-snapshot CPU samples to a single
//! value under a [`CpuMode`] and ranks threads by it, highest first.

use crate::correlate::{correlate, ThreadSlots, ThreadsOverTime};
use dw_common::{CpuMode, Snapshot, ThreadId, ThreadRecord};
use dw_math::{describe, max_or_zero, mean_over, median, SampleStats};
use serde::Serialize;

/// One thread ranked by its aggregated CPU usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuConsumer<'a> {
    pub thread_id: ThreadId,
    pub calculated_value: f64,
    /// The thread's record in each snapshot, `None` where it was absent.
    pub threads: ThreadSlots<'a>,
}

impl<'a> CpuConsumer<'a> {
    /// CPU samples from the snapshots the thread was present in.
    pub fn samples(&self) -> Vec<f64> {
        present_samples(&self.threads)
    }

    pub fn stats(&self) -> SampleStats {
        describe(&self.samples())
    }

    /// Number of snapshots the thread was present in.
    pub fn present_in(&self) -> usize {
        self.threads.iter().flatten().count()
    }

    /// Name from the latest snapshot that has the thread.
    pub fn name(&self) -> Option<&'a str> {
        self.threads
            .iter()
            .rev()
            .flatten()
            .map(|t| t.name.as_str())
            .find(|name| !name.is_empty())
    }
}

fn present_samples(slots: &[Option<&ThreadRecord>]) -> Vec<f64> {
    slots.iter().flatten().map(|t| t.cpu_usage).collect()
}

/// Reduce one thread's slots to a scalar.
///
/// `Mean` divides by `dump_count`, the length of the whole series, so a
/// thread missing from some snapshots counts as idle there. `Median` and
/// `Max` only look at the samples that exist.
pub fn calculate_value(
    slots: &[Option<&ThreadRecord>],
    mode: CpuMode,
    dump_count: usize,
) -> f64 {
    let samples = present_samples(slots);
    let value = match mode {
        CpuMode::Mean => mean_over(&samples, dump_count),
        CpuMode::Median => median(&samples),
        CpuMode::Max => max_or_zero(&samples),
    };
    // `-0.0 + 0.0` is `+0.0`: zero ties must not split under `total_cmp`.
    value + 0.0
}

/// Rank correlated threads by aggregated CPU usage.
///
/// Sorted by `calculated_value` descending; ties keep first-appearance
/// order.
pub fn aggregate<'a>(
    threads: ThreadsOverTime<'a>,
    mode: CpuMode,
    dump_count: usize,
) -> Vec<CpuConsumer<'a>> {
    let mut consumers: Vec<CpuConsumer<'a>> = threads
        .into_iter()
        .map(|(thread_id, slots)| CpuConsumer {
            thread_id,
            calculated_value: calculate_value(&slots, mode, dump_count),
            threads: slots,
        })
        .collect();

    // `sort_by` is stable.
    consumers.sort_by(|a, b| b.calculated_value.total_cmp(&a.calculated_value));

    tracing::debug!(
        mode = %mode,
        dump_count,
        consumers = consumers.len(),
        "ranked cpu consumers"
    );
    consumers
}

/// Correlate and rank in one step.
pub fn rank_consumers(snapshots: &[Snapshot], mode: CpuMode) -> Vec<CpuConsumer<'_>> {
    aggregate(correlate(snapshots), mode, snapshots.len())
}

/// The first `limit` consumers of a ranked list.
pub fn top<'c, 'a>(consumers: &'c [CpuConsumer<'a>], limit: usize) -> &'c [CpuConsumer<'a>] {
    &consumers[..limit.min(consumers.len())]
}
