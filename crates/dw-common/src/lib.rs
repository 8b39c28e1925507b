//! dumpwatch common types, IDs, and errors.
//!
//! This crate provides the foundational types shared by the analysis crates:
//! - Thread and lock identity types
//! - The immutable snapshot model consumed by the analyses
//! - The closed set of CPU aggregation modes
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod mode;
pub mod model;
pub mod output;
pub mod schema;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{LockId, ThreadId};
pub use mode::CpuMode;
pub use model::{LockRecord, Snapshot, SnapshotSeries, ThreadRecord};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
