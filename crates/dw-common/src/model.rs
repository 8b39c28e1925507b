//! Snapshot model.
//!
//! These are the structured records produced by an external thread-dump
//! parser. The analyses only ever borrow them; nothing here is mutated once
//! a series has been loaded.

use crate::id::{LockId, ThreadId};
use crate::schema::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One thread as seen in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRecord {
    /// Correlation key, stable across snapshots for the same logical thread.
    pub id: ThreadId,

    /// Thread name as printed in the dump (may be empty).
    #[serde(default)]
    pub name: String,

    /// CPU usage at capture time (non-negative).
    #[serde(default)]
    pub cpu_usage: f64,

    /// Call stack, innermost frame first.
    #[serde(default)]
    pub stack_trace: Vec<String>,

    /// Lock the thread currently holds or waits on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<LockId>,
}

impl ThreadRecord {
    pub fn new(id: impl Into<ThreadId>, cpu_usage: f64) -> Self {
        ThreadRecord {
            id: id.into(),
            name: String::new(),
            cpu_usage,
            stack_trace: Vec::new(),
            lock_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stack<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stack_trace = frames.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lock(mut self, lock_id: impl Into<LockId>) -> Self {
        self.lock_id = Some(lock_id.into());
        self
    }

    /// Number of frames in the call stack.
    pub fn stack_depth(&self) -> usize {
        self.stack_trace.len()
    }
}

/// One lock that is owned or waited on in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub id: LockId,

    /// Thread holding the lock, when the dump names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ThreadId>,

    /// Threads blocked on the lock, in dump order.
    #[serde(default)]
    pub waiting: Vec<ThreadId>,
}

impl LockRecord {
    pub fn new(id: impl Into<LockId>) -> Self {
        LockRecord {
            id: id.into(),
            owner: None,
            waiting: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<ThreadId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_waiting<I, T>(mut self, waiting: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ThreadId>,
    {
        self.waiting = waiting.into_iter().map(Into::into).collect();
        self
    }
}

/// A single thread dump: every thread and active lock at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub threads: Vec<ThreadRecord>,

    #[serde(default)]
    pub locks: Vec<LockRecord>,

    /// Running-process count sampled together with the dump.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_processes: Option<u32>,

    /// 1, 5 and 15 minute load averages sampled together with the dump.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_averages: Option<[f64; 3]>,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Snapshot {
            timestamp,
            threads: Vec::new(),
            locks: Vec::new(),
            running_processes: None,
            load_averages: None,
        }
    }

    pub fn with_threads(mut self, threads: Vec<ThreadRecord>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_locks(mut self, locks: Vec<LockRecord>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_load(mut self, load_averages: [f64; 3], running_processes: u32) -> Self {
        self.load_averages = Some(load_averages);
        self.running_processes = Some(running_processes);
        self
    }
}

/// An ordered (ascending capture time) series of snapshots.
///
/// This is the document format read by the CLI; ordering is assumed, not
/// re-validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSeries {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl SnapshotSeries {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        SnapshotSeries {
            schema_version: default_schema_version(),
            snapshots,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
