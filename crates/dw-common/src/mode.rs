//! CPU aggregation modes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a thread's per-snapshot CPU samples are reduced to one value.
///
/// The set is closed: an unknown mode can only appear at a parsing
/// boundary (CLI flag, config file) and is rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuMode {
    /// Sum of samples divided by the number of snapshots in the series.
    #[default]
    #[serde(alias = "avg", alias = "average")]
    #[value(aliases = ["avg", "average"])]
    Mean,
    /// Median of the samples the thread actually has.
    Median,
    /// Largest sample, or 0 when there are none.
    #[serde(alias = "maximum")]
    #[value(alias = "maximum")]
    Max,
}

impl CpuMode {
    pub const ALL: [CpuMode; 3] = [CpuMode::Mean, CpuMode::Median, CpuMode::Max];
}

impl std::fmt::Display for CpuMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CpuMode::Mean => write!(f, "mean"),
            CpuMode::Median => write!(f, "median"),
            CpuMode::Max => write!(f, "max"),
        }
    }
}
