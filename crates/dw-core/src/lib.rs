//! dumpwatch core library
//!
//! Analyses over a time series of thread dumps:
//! - Thread correlation across snapshots
//! - CPU aggregation (mean, median, max) and ranking
//! - Lock contention (monitor) building and classification
//! - Series summary, input loading, config, and reporting
//!
//! The binary entry point is in `main.rs`.

pub mod config;
pub mod contention;
pub mod correlate;
pub mod cpu;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod monitors;
pub mod report;
pub mod summary;

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use contention::{has_any_owner, is_queue_thread, MonitorFilter, QueueHeuristic};
pub use correlate::{correlate, ThreadsOverTime};
pub use cpu::{aggregate, rank_consumers, CpuConsumer};
pub use monitors::{build as build_monitors, Monitor, MonitorOverTime, Waiter};
