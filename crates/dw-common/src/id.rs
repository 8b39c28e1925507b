//! Thread and lock identity types.
//!
//! A thread is identified across snapshots by its numeric id. The id is
//! assumed stable for the life of a logical thread and never reused within
//! one snapshot series; the analyses rely on that without verifying it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Thread ID wrapper with display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ThreadId {
    fn from(id: u64) -> Self {
        ThreadId(id)
    }
}

/// Lock (monitor) identity, usually the object address printed in the dump.
///
/// Example: `0x00000000c5a3b2d8`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(pub String);

impl LockId {
    pub fn new(id: impl Into<String>) -> Self {
        LockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LockId {
    fn from(id: &str) -> Self {
        LockId(id.to_string())
    }
}

impl From<String> for LockId {
    fn from(id: String) -> Self {
        LockId(id)
    }
}
