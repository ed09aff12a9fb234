//! Effect size, significance and power analysis for two timing samples.

use super::summary::{mean, variance};
use super::{normal_cdf, z_alpha, z_power};
use crate::config::EffectSizeThresholds;
use serde::Serialize;

/// Conventional power target when none is configured
pub const DEFAULT_TARGET_POWER: f64 = 0.8;

/// Cohen's d: `|mean1 - mean2| / pooled_std`, pooled variance weighted by n-1.
///
/// 0 when either group is empty or the pooled deviation vanishes.
pub fn calculate_effect_size(group1: &[f64], group2: &[f64]) -> f64 {
    let (n1, n2) = (group1.len(), group2.len());
    if n1 == 0 || n2 == 0 || n1 + n2 < 3 {
        return 0.0;
    }
    let pooled_var = ((n1 - 1) as f64 * variance(group1) + (n2 - 1) as f64 * variance(group2))
        / (n1 + n2 - 2) as f64;
    let pooled_std = pooled_var.sqrt();
    if pooled_std < f64::EPSILON {
        return 0.0;
    }
    (mean(group1) - mean(group2)).abs() / pooled_std
}

/// Samples per group to detect `effect_size` at `alpha` with the target power:
/// `ceil(2 * ((z_{alpha/2} + z_power) / d)^2)`.
///
/// `None` for a non-positive or non-finite effect size.
pub fn calculate_required_sample_size(effect_size: f64, alpha: f64, power: f64) -> Option<usize> {
    if !effect_size.is_finite() || effect_size <= 0.0 {
        return None;
    }
    let z = (z_alpha(alpha) + z_power(power)) / effect_size;
    Some((2.0 * z * z).ceil() as usize)
}

/// Approximate power of a two-sample design with `n` samples per group
pub fn calculate_power(n: usize, effect_size: f64, alpha: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let shift = effect_size.abs() * (n as f64 / 2.0).sqrt();
    1.0 - normal_cdf(z_alpha(alpha) - shift)
}

/// Welch's t-test outcome
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SignificanceResult {
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    /// Two-tailed, from the normal approximation
    pub p_value: f64,
    pub is_significant: bool,
    /// mean1 - mean2
    pub mean_difference: f64,
}

/// Welch's t-test with Welch-Satterthwaite degrees of freedom
pub fn calculate_significance(group1: &[f64], group2: &[f64], alpha: f64) -> SignificanceResult {
    let (n1, n2) = (group1.len() as f64, group2.len() as f64);
    let mean_difference = mean(group1) - mean(group2);
    let se1 = if n1 > 0.0 { variance(group1) / n1 } else { 0.0 };
    let se2 = if n2 > 0.0 { variance(group2) / n2 } else { 0.0 };
    let se_diff = (se1 + se2).sqrt();

    // Both groups constant
    if se_diff < f64::EPSILON {
        let differs = mean_difference.abs() > f64::EPSILON;
        return SignificanceResult {
            t_statistic: if differs { mean_difference.signum() * f64::INFINITY } else { 0.0 },
            degrees_of_freedom: (n1 + n2 - 2.0).max(0.0),
            p_value: if differs { 0.0 } else { 1.0 },
            is_significant: differs,
            mean_difference,
        };
    }

    let t_statistic = mean_difference / se_diff;
    let df_denominator = if n1 > 1.0 { se1 * se1 / (n1 - 1.0) } else { 0.0 }
        + if n2 > 1.0 { se2 * se2 / (n2 - 1.0) } else { 0.0 };
    let degrees_of_freedom = if df_denominator > 0.0 {
        (se1 + se2).powi(2) / df_denominator
    } else {
        n1 + n2 - 2.0
    };
    let p_value = (2.0 * (1.0 - normal_cdf(t_statistic.abs()))).clamp(0.0, 1.0);

    SignificanceResult {
        t_statistic,
        degrees_of_freedom,
        p_value,
        is_significant: p_value < alpha,
        mean_difference,
    }
}

/// Normal-approximation interval for mean1 - mean2
pub fn confidence_interval(group1: &[f64], group2: &[f64], confidence_level: f64) -> (f64, f64) {
    let se1 = if group1.is_empty() { 0.0 } else { variance(group1) / group1.len() as f64 };
    let se2 = if group2.is_empty() { 0.0 } else { variance(group2) / group2.len() as f64 };
    let margin = z_alpha(1.0 - confidence_level) * (se1 + se2).sqrt();
    let diff = mean(group1) - mean(group2);
    (diff - margin, diff + margin)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

pub fn classify_effect_size(cohens_d: f64, thresholds: &EffectSizeThresholds) -> EffectSize {
    let d = cohens_d.abs();
    if d >= thresholds.large {
        EffectSize::Large
    } else if d >= thresholds.medium {
        EffectSize::Medium
    } else if d >= thresholds.small {
        EffectSize::Small
    } else {
        EffectSize::Negligible
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendation {
    /// Current power meets the target
    Sufficient,
    /// Collect at least `required_sample_size` samples per group
    IncreaseSampleSize { required_sample_size: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PowerAnalysisResult {
    pub observed_effect_size: f64,
    /// Smaller of the two group sizes
    pub current_sample_size: usize,
    /// Power to detect the target effect with the current sample size
    pub current_power: f64,
    pub recommendation: Recommendation,
    pub statistical_significance: SignificanceResult,
}

/// Outcome of [`validate_current_design`]; check the status before reading numbers
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PowerAnalysis {
    InsufficientData { reason: String },
    Complete(PowerAnalysisResult),
}

impl PowerAnalysis {
    pub fn result(&self) -> Option<&PowerAnalysisResult> {
        match self {
            PowerAnalysis::Complete(result) => Some(result),
            PowerAnalysis::InsufficientData { .. } => None,
        }
    }
}

/// Decide whether pilot samples are large enough to detect `target_effect_size`
/// with at least `target_power`
pub fn validate_current_design(
    group1: &[f64],
    group2: &[f64],
    target_effect_size: f64,
    alpha: f64,
    target_power: f64,
) -> PowerAnalysis {
    let insufficient = |reason: &str| PowerAnalysis::InsufficientData { reason: reason.to_string() };

    if group1.is_empty() || group2.is_empty() {
        return insufficient("missing pilot group");
    }
    if group1.len() < 2 || group2.len() < 2 {
        return insufficient("each group needs at least two samples");
    }
    if group1.iter().chain(group2).any(|v| !v.is_finite()) {
        return insufficient("pilot data contains non-finite values");
    }
    if !target_effect_size.is_finite() || target_effect_size <= 0.0 {
        return insufficient("target effect size must be positive");
    }

    let current_sample_size = group1.len().min(group2.len());
    let current_power = calculate_power(current_sample_size, target_effect_size, alpha);
    let recommendation = if current_power >= target_power {
        Recommendation::Sufficient
    } else {
        match calculate_required_sample_size(target_effect_size, alpha, target_power) {
            Some(required_sample_size) => Recommendation::IncreaseSampleSize { required_sample_size },
            None => return insufficient("target effect size must be positive"),
        }
    };

    PowerAnalysis::Complete(PowerAnalysisResult {
        observed_effect_size: calculate_effect_size(group1, group2),
        current_sample_size,
        current_power,
        recommendation,
        statistical_significance: calculate_significance(group1, group2, alpha),
    })
}
