//! Contention classification and monitor filtering.
//!
//! Idle pool workers parked on a work queue show up as heavy "contention":
//! many waiters, every snapshot. They are recognisable by a lock that never
//! has an owner and waiters with short, repetitive stacks. Real contention
//! has an owner holding the lock, or waiters deep inside application code.

use crate::monitors::MonitorOverTime;
use dw_config::MonitorSettings;
use serde::{Deserialize, Serialize};

/// Deepest waiter stack still treated as an idle queue wait.
pub const QUEUE_STACK_DEPTH_LIMIT: usize = dw_config::analysis::DEFAULT_QUEUE_STACK_DEPTH;

/// True iff at least one observation of the lock had a resolved owner.
pub fn has_any_owner(monitor: &MonitorOverTime<'_>) -> bool {
    monitor.monitors().iter().any(|m| m.has_owner())
}

/// Queue classification with an adjustable stack-depth threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueHeuristic {
    pub max_stack_depth: usize,
}

impl Default for QueueHeuristic {
    fn default() -> Self {
        QueueHeuristic {
            max_stack_depth: QUEUE_STACK_DEPTH_LIMIT,
        }
    }
}

impl QueueHeuristic {
    pub fn new(max_stack_depth: usize) -> Self {
        QueueHeuristic { max_stack_depth }
    }

    /// True iff every observation has no owner and every resolved waiter's
    /// stack is at most `max_stack_depth` frames.
    ///
    /// Stops at the first owner or over-deep waiter. Waiters that could not
    /// be resolved have no known stack and never disqualify.
    pub fn is_queue_thread(&self, monitor: &MonitorOverTime<'_>) -> bool {
        for observation in monitor.monitors() {
            if observation.has_owner() {
                return false;
            }
            for waiter in &observation.waiting {
                if waiter
                    .stack_depth()
                    .is_some_and(|depth| depth > self.max_stack_depth)
                {
                    return false;
                }
            }
        }
        true
    }
}

/// [`QueueHeuristic::is_queue_thread`] with the default threshold.
pub fn is_queue_thread(monitor: &MonitorOverTime<'_>) -> bool {
    QueueHeuristic::default().is_queue_thread(monitor)
}

/// Independently toggled monitor filters, combined with logical AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorFilter {
    /// Keep only locks that had an owner at some point.
    pub with_owner: bool,
    /// Drop locks classified as idle queues.
    pub without_idle: bool,
    /// Keep only locks that never had an owner.
    pub without_owner: bool,
    pub heuristic: QueueHeuristic,
}

impl Default for MonitorFilter {
    fn default() -> Self {
        MonitorFilter {
            with_owner: false,
            without_idle: true,
            without_owner: false,
            heuristic: QueueHeuristic::default(),
        }
    }
}

impl From<&MonitorSettings> for MonitorFilter {
    fn from(settings: &MonitorSettings) -> Self {
        MonitorFilter {
            with_owner: settings.with_owner,
            without_idle: settings.without_idle,
            without_owner: settings.without_owner,
            heuristic: QueueHeuristic::new(settings.queue_stack_depth),
        }
    }
}

impl MonitorFilter {
    /// Everything with at least one waiter, nothing else hidden.
    pub fn all() -> Self {
        MonitorFilter {
            without_idle: false,
            ..MonitorFilter::default()
        }
    }

    /// Whether `monitor` passes every enabled filter.
    pub fn matches(&self, monitor: &MonitorOverTime<'_>) -> bool {
        if monitor.waiting_sum() == 0 {
            return false;
        }
        if self.without_idle && self.heuristic.is_queue_thread(monitor) {
            return false;
        }
        if self.with_owner && !has_any_owner(monitor) {
            return false;
        }
        if self.without_owner && has_any_owner(monitor) {
            return false;
        }
        true
    }

    /// Filter a ranked list, keeping its order.
    pub fn apply<'m, 'a>(&self, monitors: &'m [MonitorOverTime<'a>]) -> Vec<&'m MonitorOverTime<'a>> {
        monitors.iter().filter(|m| self.matches(m)).collect()
    }
}
