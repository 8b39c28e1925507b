//! dumpwatch configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for analysis.json
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation

pub mod analysis;
pub mod resolve;
pub mod validate;

pub use analysis::{AnalysisConfig, CpuSettings, MonitorSettings};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
