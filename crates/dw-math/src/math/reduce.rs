//! Reductions of a sample set to one scalar.
//!
//! All functions take the samples that were actually observed. Missing
//! observations are never encoded as sentinel values; callers decide what a
//! missing observation means (see [`mean_over`]).

use std::cmp::Ordering;

/// Sum of the samples. Empty input sums to 0.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

/// Sum of the samples divided by `denominator`.
///
/// The denominator is the size of the population the samples were drawn
/// from, not the number of samples: unobserved members count as 0. Returns
/// 0 when `denominator` is 0.
pub fn mean_over(values: &[f64], denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    sum(values) / denominator as f64
}

/// Median of the samples.
///
/// Sorts a copy ascending and averages the elements at
/// `floor((n-1)/2)` and `ceil((n-1)/2)`, which is the usual median for odd
/// and even `n` and the sample itself for `n == 1`. Empty input yields 0.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(ascending);

    let last = sorted.len() - 1;
    let low = last / 2;
    let high = last.div_ceil(2);
    (sorted[low] + sorted[high]) / 2.0
}

/// Largest sample, folding from an initial 0.
///
/// Empty input (or input with no positive sample) yields 0.
pub fn max_or_zero(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(0.0, |max, &v| if v > max { v } else { max })
}

/// Total order used for sorting samples; NaN sorts last.
pub fn ascending(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}
