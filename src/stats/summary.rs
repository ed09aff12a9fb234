//! Descriptive statistics over timing samples.

use serde::Serialize;

/// Fewest samples for which quartiles are meaningful
pub const MIN_IQR_SAMPLES: usize = 4;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with the n-1 denominator; 0 below two samples
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Linear-interpolated percentile of already sorted values, `p` in [0, 1]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let frac = rank - lower as f64;
    match sorted.get(lower + 1) {
        Some(&next) => sorted[lower] + frac * (next - sorted[lower]),
        None => sorted[lower],
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Descriptive statistics of one sample group
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// std / mean, 0 when the mean is 0
    pub coefficient_of_variation: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted = sorted(values);
        let mean = mean(values);
        let std_dev = std_dev(values);
        Self {
            count: values.len(),
            mean,
            std_dev,
            median: percentile_sorted(&sorted, 0.5),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            coefficient_of_variation: if mean > 0.0 { std_dev / mean } else { 0.0 },
        }
    }
}

/// Indices of values outside `[q1 - k*iqr, q3 + k*iqr]`.
///
/// Returns nothing for fewer than [`MIN_IQR_SAMPLES`] values.
pub fn detect_outliers(values: &[f64], multiplier: f64) -> Vec<usize> {
    if values.len() < MIN_IQR_SAMPLES {
        return Vec::new();
    }
    let sorted = sorted(values);
    let q1 = percentile_sorted(&sorted, 0.25);
    let q3 = percentile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low, high) = (q1 - multiplier * iqr, q3 + multiplier * iqr);

    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < low || v > high)
        .map(|(i, _)| i)
        .collect()
}

/// Mean of the second half over the mean of the first half, in invocation order.
///
/// Values above 1 mean runs got slower over time. `None` below four samples
/// or when the first half averages zero.
pub fn drift_ratio(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_IQR_SAMPLES {
        return None;
    }
    let (first, second) = values.split_at(values.len() / 2);
    let base = mean(first);
    (base > 0.0).then(|| mean(second) / base)
}
