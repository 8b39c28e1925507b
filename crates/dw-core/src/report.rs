//! Report payloads for the CLI.
//!
//! Each report is a serializable view over one analysis, flattened so it
//! no longer borrows the snapshot series, plus Markdown and one-line
//! renderings for humans.

use crate::contention::{has_any_owner, MonitorFilter};
use crate::cpu::{rank_consumers, top, CpuConsumer};
use crate::monitors::{build, MonitorOverTime};
use crate::summary::{has_threads, summarize, SeriesSummary};
use chrono::{DateTime, Utc};
use dw_common::{CpuMode, OutputFormat, Snapshot, ThreadId, SCHEMA_VERSION};
use dw_math::SampleStats;
use serde::Serialize;
use std::fmt::Write as _;

const NO_THREAD_DATA: &str = "No thread data in the snapshot series.";
const NO_MATCHING_MONITORS: &str = "No monitors match the selected criteria.";

/// Human renderings of a report.
pub trait Render: Serialize {
    fn to_markdown(&self) -> String;
    fn to_summary_line(&self) -> String;

    /// Render in the requested output format.
    fn render(&self, format: OutputFormat) -> dw_common::Result<String> {
        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Md => self.to_markdown(),
            OutputFormat::Summary => self.to_summary_line(),
        })
    }
}

/// One ranked thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuConsumerView {
    pub rank: usize,
    pub thread_id: ThreadId,
    pub name: Option<String>,
    pub calculated_value: f64,
    pub present_in: usize,
    /// CPU usage per snapshot, `None` where the thread was absent.
    pub samples: Vec<Option<f64>>,
    pub stats: SampleStats,
}

impl CpuConsumerView {
    fn from_consumer(rank: usize, consumer: &CpuConsumer<'_>) -> Self {
        CpuConsumerView {
            rank,
            thread_id: consumer.thread_id,
            name: consumer.name().map(str::to_owned),
            calculated_value: consumer.calculated_value,
            present_in: consumer.present_in(),
            samples: consumer
                .threads
                .iter()
                .map(|slot| slot.map(|t| t.cpu_usage))
                .collect(),
            stats: consumer.stats(),
        }
    }
}

/// Top CPU consumers of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub mode: CpuMode,
    pub limit: usize,
    pub dump_count: usize,
    pub total_consumers: usize,
    pub consumers: Vec<CpuConsumerView>,
}

impl CpuReport {
    pub fn build(snapshots: &[Snapshot], mode: CpuMode, limit: usize) -> Self {
        let ranked = rank_consumers(snapshots, mode);
        let consumers = top(&ranked, limit)
            .iter()
            .enumerate()
            .map(|(i, c)| CpuConsumerView::from_consumer(i + 1, c))
            .collect();

        CpuReport {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            mode,
            limit,
            dump_count: snapshots.len(),
            total_consumers: ranked.len(),
            consumers,
        }
    }
}

impl Render for CpuReport {
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# CPU Consumers ({})", self.mode);
        let _ = writeln!(
            out,
            "Top {} of {} threads over {} dumps.",
            self.consumers.len(),
            self.total_consumers,
            self.dump_count
        );
        if self.consumers.is_empty() {
            let _ = writeln!(out, "\n{}", NO_THREAD_DATA);
            return out;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "| # | Thread | Name | {} | Present | Samples |", self.mode);
        let _ = writeln!(out, "|---|--------|------|------|---------|---------|");
        for c in &self.consumers {
            let samples: Vec<String> = c
                .samples
                .iter()
                .map(|s| match s {
                    Some(v) => format!("{:.1}", v),
                    None => "-".to_string(),
                })
                .collect();
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.2} | {}/{} | {} |",
                c.rank,
                c.thread_id,
                c.name.as_deref().unwrap_or(""),
                c.calculated_value,
                c.present_in,
                self.dump_count,
                samples.join(" ")
            );
        }
        out
    }

    fn to_summary_line(&self) -> String {
        match self.consumers.first() {
            Some(c) => format!(
                "{} threads over {} dumps; top {} consumer: thread {} ({:.2})",
                self.total_consumers, self.dump_count, self.mode, c.thread_id, c.calculated_value
            ),
            None => format!("0 threads over {} dumps", self.dump_count),
        }
    }
}

/// One contended lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorView {
    pub rank: usize,
    pub id: String,
    pub waiting_sum: usize,
    /// Number of snapshots the lock appeared in.
    pub observed_in: usize,
    pub has_owner: bool,
    pub queue_like: bool,
    /// Distinct resolved owners, in order of first appearance.
    pub owners: Vec<ThreadId>,
    /// Deepest resolved waiter stack.
    pub max_waiter_depth: Option<usize>,
    /// Waiter count per snapshot, 0 where the lock was absent.
    pub waiting_per_dump: Vec<usize>,
}

impl MonitorView {
    fn from_monitor(
        rank: usize,
        monitor: &MonitorOverTime<'_>,
        filter: &MonitorFilter,
        dump_count: usize,
    ) -> Self {
        let mut owners: Vec<ThreadId> = Vec::new();
        let mut waiting_per_dump = vec![0; dump_count];
        let mut max_waiter_depth: Option<usize> = None;

        for observation in monitor.monitors() {
            if let Some(owner) = observation.owner {
                if !owners.contains(&owner.id) {
                    owners.push(owner.id);
                }
            }
            if let Some(slot) = waiting_per_dump.get_mut(observation.snapshot_index) {
                *slot += observation.waiting.len();
            }
            for depth in observation.waiting.iter().filter_map(|w| w.stack_depth()) {
                max_waiter_depth = Some(max_waiter_depth.map_or(depth, |d| d.max(depth)));
            }
        }

        MonitorView {
            rank,
            id: monitor.id().to_string(),
            waiting_sum: monitor.waiting_sum(),
            observed_in: monitor.monitors().len(),
            has_owner: has_any_owner(monitor),
            queue_like: filter.heuristic.is_queue_thread(monitor),
            owners,
            max_waiter_depth,
            waiting_per_dump,
        }
    }
}

/// Contended locks of a series after filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub filter: MonitorFilter,
    pub dump_count: usize,
    pub has_threads: bool,
    /// Locks seen in the series before filtering.
    pub total_monitors: usize,
    pub monitors: Vec<MonitorView>,
}

impl MonitorReport {
    pub fn build(snapshots: &[Snapshot], filter: MonitorFilter) -> Self {
        let all = build(snapshots);
        let monitors = filter
            .apply(&all)
            .into_iter()
            .enumerate()
            .map(|(i, m)| MonitorView::from_monitor(i + 1, m, &filter, snapshots.len()))
            .collect();

        MonitorReport {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            filter,
            dump_count: snapshots.len(),
            has_threads: has_threads(snapshots),
            total_monitors: all.len(),
            monitors,
        }
    }
}

impl Render for MonitorReport {
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Monitors");
        let _ = writeln!(
            out,
            "Filters: with_owner={} without_idle={} without_owner={} (queue stack depth <= {})",
            self.filter.with_owner,
            self.filter.without_idle,
            self.filter.without_owner,
            self.filter.heuristic.max_stack_depth
        );
        let _ = writeln!(out);
        if !self.has_threads {
            let _ = writeln!(out, "{}", NO_THREAD_DATA);
            return out;
        }
        if self.monitors.is_empty() {
            let _ = writeln!(out, "{}", NO_MATCHING_MONITORS);
            return out;
        }
        let _ = writeln!(out, "| # | Lock | Waiting | Seen | Owners | Max depth | Per dump |");
        let _ = writeln!(out, "|---|------|---------|------|--------|-----------|----------|");
        for m in &self.monitors {
            let owners: Vec<String> = m.owners.iter().map(ToString::to_string).collect();
            let per_dump: Vec<String> = m.waiting_per_dump.iter().map(ToString::to_string).collect();
            let _ = writeln!(
                out,
                "| {} | {} | {} | {}/{} | {} | {} | {} |",
                m.rank,
                m.id,
                m.waiting_sum,
                m.observed_in,
                self.dump_count,
                if owners.is_empty() { "-".to_string() } else { owners.join(",") },
                m.max_waiter_depth.map_or("-".to_string(), |d| d.to_string()),
                per_dump.join(" ")
            );
        }
        out
    }

    fn to_summary_line(&self) -> String {
        if !self.has_threads {
            return NO_THREAD_DATA.to_string();
        }
        match self.monitors.first() {
            Some(m) => format!(
                "{} of {} monitors shown; most contended: {} ({} waiting)",
                self.monitors.len(),
                self.total_monitors,
                m.id,
                m.waiting_sum
            ),
            None => format!("0 of {} monitors shown", self.total_monitors),
        }
    }
}

/// Series overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SeriesSummary,
}

impl SummaryReport {
    pub fn build(snapshots: &[Snapshot]) -> Self {
        SummaryReport {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            summary: summarize(snapshots),
        }
    }
}

impl Render for SummaryReport {
    fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(out, "# Summary");
        let _ = writeln!(out, "- Dumps: {}", s.dump_count);
        if let (Some(first), Some(last)) = (s.first_capture, s.last_capture) {
            let _ = writeln!(out, "- Captured: {} .. {}", first.to_rfc3339(), last.to_rfc3339());
        }
        let _ = writeln!(out, "- Distinct threads: {}", s.distinct_threads);
        let _ = writeln!(out, "- Distinct locks: {}", s.distinct_locks);
        if !s.has_threads {
            let _ = writeln!(out, "\n{}", NO_THREAD_DATA);
        }
        if !s.running_processes.is_empty() {
            let _ = writeln!(out, "\n## Running processes");
            for p in &s.running_processes {
                let _ = writeln!(out, "- {}: {}", p.timestamp.to_rfc3339(), p.running_processes);
            }
        }
        out
    }

    fn to_summary_line(&self) -> String {
        let s = &self.summary;
        format!(
            "{} dumps, {} threads, {} locks",
            s.dump_count, s.distinct_threads, s.distinct_locks
        )
    }
}
