//! Analysis configuration types.
//!
//! Every field has a default, so an empty JSON object `{}` is a complete
//! configuration.

use dw_common::CpuMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

/// Number of top consumers shown when nothing else is configured.
pub const DEFAULT_CPU_LIMIT: usize = 40;

/// Deepest waiter stack still considered idle pool queuing.
///
/// Empirical: parked pool workers show short, repetitive wait stacks.
pub const DEFAULT_QUEUE_STACK_DEPTH: usize = 11;

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub cpu: CpuSettings,

    #[serde(default)]
    pub monitors: MonitorSettings,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            cpu: CpuSettings::default(),
            monitors: MonitorSettings::default(),
        }
    }
}

/// CPU consumer ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSettings {
    #[serde(default)]
    pub mode: CpuMode,

    /// How many top consumers to show.
    #[serde(default = "default_cpu_limit")]
    pub limit: usize,
}

fn default_cpu_limit() -> usize {
    DEFAULT_CPU_LIMIT
}

impl Default for CpuSettings {
    fn default() -> Self {
        Self {
            mode: CpuMode::default(),
            limit: DEFAULT_CPU_LIMIT,
        }
    }
}

/// Monitor (lock contention) filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Keep only monitors that had an owner in at least one snapshot.
    #[serde(default)]
    pub with_owner: bool,

    /// Hide monitors classified as idle pool queues.
    #[serde(default = "default_true")]
    pub without_idle: bool,

    /// Keep only monitors that never had an owner.
    #[serde(default)]
    pub without_owner: bool,

    /// Waiter stack depth above which contention is considered real.
    #[serde(default = "default_queue_stack_depth")]
    pub queue_stack_depth: usize,
}

fn default_true() -> bool {
    true
}

fn default_queue_stack_depth() -> usize {
    DEFAULT_QUEUE_STACK_DEPTH
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            with_owner: false,
            without_idle: true,
            without_owner: false,
            queue_stack_depth: DEFAULT_QUEUE_STACK_DEPTH,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }
}
