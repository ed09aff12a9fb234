//! Statistical analysis of execution-time samples.
//!
//! - [`summary`]: descriptive statistics, IQR outliers, drift
//! - [`power`]: effect size, Welch's t-test, power and sample size planning
//! - [`quality`]: per-group quality control and language comparisons

pub mod power;
pub mod quality;
pub mod summary;

pub use power::{
    calculate_effect_size, calculate_power, calculate_required_sample_size, calculate_significance,
    classify_effect_size, confidence_interval, validate_current_design, EffectSize, PowerAnalysis,
    PowerAnalysisResult, Recommendation, SignificanceResult,
};
pub use quality::{assess_quality, compare_languages, DataQuality, LanguageComparison, QualityReport};
pub use summary::{detect_outliers, drift_ratio, mean, std_dev, Summary};

/// Two-sided critical values `z_{alpha/2}`, keyed by alpha
const ALPHA_Z: [(f64, f64); 4] = [(0.001, 3.291), (0.01, 2.576), (0.05, 1.960), (0.10, 1.645)];

/// One-sided `z_{power}` values, keyed by target power
const POWER_Z: [(f64, f64); 4] = [(0.8, 0.842), (0.9, 1.282), (0.95, 1.645), (0.99, 2.326)];

fn nearest(table: &[(f64, f64)], key: f64) -> f64 {
    table
        .iter()
        .min_by(|a, b| (a.0 - key).abs().total_cmp(&(b.0 - key).abs()))
        .map(|&(_, z)| z)
        .unwrap_or(table[0].1)
}

/// Two-sided critical z for `alpha`, from the closest tabulated level
pub fn z_alpha(alpha: f64) -> f64 {
    nearest(&ALPHA_Z, alpha)
}

/// z for the target power, from the closest tabulated level
pub fn z_power(power: f64) -> f64 {
    nearest(&POWER_Z, power)
}

/// Standard normal CDF (Abramowitz & Stegun 26.2.17, |error| < 7.5e-8)
pub fn normal_cdf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.231_641_9 * x.abs());
    let density = 0.398_942_280_401_432_7 * (-x * x / 2.0).exp();
    let poly = t
        * (0.319_381_530
            + t * (-0.356_563_782 + t * (1.781_477_937 + t * (-1.821_255_978 + t * 1.330_274_429))));
    let upper = density * poly;
    if x >= 0.0 {
        1.0 - upper
    } else {
        upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_known_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975_002).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_998).abs() < 1e-6);
        assert!(normal_cdf(8.0) > 0.999_999);
    }

    #[test]
    fn test_z_lookup_uses_nearest_level() {
        assert_eq!(z_alpha(0.05), 1.960);
        assert_eq!(z_alpha(0.04), 1.960);
        assert_eq!(z_alpha(0.001), 3.291);
        assert_eq!(z_power(0.8), 0.842);
        assert_eq!(z_power(0.85), 0.842);
        assert_eq!(z_power(0.99), 2.326);
    }
}
