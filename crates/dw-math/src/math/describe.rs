//! Descriptive statistics over a sample set.

use crate::math::reduce::{max_or_zero, median, sum};
use serde::{Deserialize, Serialize};

/// Summary of the samples a thread actually has.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStats {
    /// Number of observed samples.
    pub count: usize,
    pub sum: f64,
    /// Smallest observed sample (0 when there are none).
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Describe a sample set.
pub fn describe(values: &[f64]) -> SampleStats {
    if values.is_empty() {
        return SampleStats::default();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    SampleStats {
        count: values.len(),
        sum: sum(values),
        min,
        max: max_or_zero(values),
        median: median(values),
    }
}
