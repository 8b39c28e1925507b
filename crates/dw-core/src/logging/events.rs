//! Structured event definitions for logging.

use serde::{Deserialize, Serialize};

/// Analysis stages in the dw-core pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading the snapshot series.
    Load,
    /// CPU consumer ranking.
    Cpu,
    /// Monitor building and filtering.
    Monitors,
    /// Series summary.
    Summary,
    /// Writing the report to stdout.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Cpu => "cpu",
            Stage::Monitors => "monitors",
            Stage::Summary => "summary",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Input
    pub const SERIES_LOADED: &str = "series.loaded";
    pub const SERIES_EMPTY: &str = "series.empty";

    // Analyses
    pub const CPU_RANKED: &str = "cpu.ranked";
    pub const MONITORS_FILTERED: &str = "monitors.filtered";
    pub const SUMMARY_BUILT: &str = "summary.built";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    // Error events
    pub const INPUT_ERROR: &str = "input_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation context carried by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
    /// Snapshot series being analysed, once known.
    pub input: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [Stage::Init, Stage::Load, Stage::Cpu, Stage::Monitors, Stage::Summary, Stage::Report] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc").with_input("dumps.json");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.input.as_deref(), Some("dumps.json"));
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::RUN_STARTED, "run.started");
        assert_eq!(event_names::MONITORS_FILTERED, "monitors.filtered");
    }
}
