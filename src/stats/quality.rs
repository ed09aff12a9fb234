//! Per-group quality control and pairwise language comparison.

use super::power::{
    calculate_effect_size, calculate_significance, classify_effect_size, confidence_interval,
    validate_current_design, EffectSize, PowerAnalysis, SignificanceResult,
};
use super::summary::{detect_outliers, drift_ratio, Summary};
use crate::config::{QcConfig, StatisticsConfig};
use crate::datagen::Scale;
use crate::params::TaskKind;
use crate::results::ExecutionResult;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Valid,
    Warning,
    Invalid,
}

/// Quality assessment of one task x language x scale group
#[derive(Clone, Debug, Serialize)]
pub struct QualityReport {
    pub task: TaskKind,
    pub language: String,
    pub scale: Scale,
    /// Execution times after outlier removal
    pub summary: Summary,
    pub memory: Summary,
    pub total_runs: usize,
    pub successful_runs: usize,
    pub outliers: usize,
    pub failure_rate: f64,
    /// Second-half over first-half mean, in invocation order
    pub drift_ratio: Option<f64>,
    pub quality: DataQuality,
    pub issues: Vec<String>,
}

impl QualityReport {
    pub fn success_rate(&self) -> f64 {
        1.0 - self.failure_rate
    }
}

type GroupKey<'a> = (TaskKind, Scale, &'a str);

/// Results grouped by task x scale x language, invocation order preserved
fn group(results: &[ExecutionResult]) -> BTreeMap<GroupKey<'_>, Vec<&ExecutionResult>> {
    let mut groups: BTreeMap<GroupKey<'_>, Vec<&ExecutionResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry((result.task, result.scale, result.language.as_str()))
            .or_default()
            .push(result);
    }
    groups
}

/// Successful execution times with IQR outliers removed, plus the outlier count
fn cleaned_times(group: &[&ExecutionResult], multiplier: f64) -> (Vec<f64>, usize) {
    let times: Vec<f64> = group.iter().filter(|r| r.success).map(|r| r.execution_time).collect();
    let outliers = detect_outliers(&times, multiplier);
    let cleaned = times
        .iter()
        .enumerate()
        .filter(|(i, _)| !outliers.contains(i))
        .map(|(_, &t)| t)
        .collect();
    (cleaned, outliers.len())
}

fn assess_group(key: GroupKey<'_>, group: &[&ExecutionResult], qc: &QcConfig) -> QualityReport {
    let (task, scale, language) = key;
    let total_runs = group.len();
    let successful: Vec<&ExecutionResult> = group.iter().copied().filter(|r| r.success).collect();
    let failure_rate = if total_runs == 0 {
        0.0
    } else {
        (total_runs - successful.len()) as f64 / total_runs as f64
    };

    let (cleaned, outliers) = cleaned_times(group, qc.outlier_iqr_multiplier);
    let summary = Summary::from_values(&cleaned);
    let memory: Vec<f64> = successful.iter().map(|r| r.memory_used as f64).collect();
    let all_times: Vec<f64> = successful.iter().map(|r| r.execution_time).collect();

    let mut issues = Vec::new();
    let mut quality = DataQuality::Valid;
    if successful.len() < qc.min_valid_samples {
        issues.push(format!(
            "insufficient samples: {} < {}",
            successful.len(),
            qc.min_valid_samples
        ));
        quality = DataQuality::Invalid;
    }
    if failure_rate > qc.max_failure_rate {
        issues.push(format!(
            "high failure rate: {:.1}% > {:.1}%",
            failure_rate * 100.0,
            qc.max_failure_rate * 100.0
        ));
        quality = DataQuality::Invalid;
    }
    let cv = summary.coefficient_of_variation;
    if cv > qc.extreme_coefficient_variation {
        issues.push(format!(
            "extreme variability: CV={cv:.3} > {:.3}",
            qc.extreme_coefficient_variation
        ));
        quality = DataQuality::Invalid;
    } else if cv > qc.max_coefficient_variation {
        issues.push(format!("high variability: CV={cv:.3} > {:.3}", qc.max_coefficient_variation));
        quality = quality.max(DataQuality::Warning);
    }

    debug!(task = %task, language, scale = %scale, ?quality, outliers, "assessed group");
    QualityReport {
        task,
        language: language.to_string(),
        scale,
        summary,
        memory: Summary::from_values(&memory),
        total_runs,
        successful_runs: successful.len(),
        outliers,
        failure_rate,
        drift_ratio: drift_ratio(&all_times),
        quality,
        issues,
    }
}

/// Quality reports for every task x language x scale group present in `results`
pub fn assess_quality(results: &[ExecutionResult], qc: &QcConfig) -> Vec<QualityReport> {
    group(results)
        .into_iter()
        .map(|(key, group)| assess_group(key, &group, qc))
        .collect()
}

/// Statistical comparison of two languages on one task x scale
#[derive(Clone, Debug, Serialize)]
pub struct LanguageComparison {
    pub task: TaskKind,
    pub scale: Scale,
    pub baseline: String,
    pub candidate: String,
    pub baseline_stats: Summary,
    pub candidate_stats: Summary,
    /// baseline - candidate
    pub significance: SignificanceResult,
    pub cohens_d: f64,
    pub effect_size: EffectSize,
    pub confidence_interval: (f64, f64),
    /// Set only when the difference is significant
    pub faster: Option<String>,
    pub recommendation: String,
    /// Whether the sample size can detect the minimum effect of interest
    pub power_analysis: PowerAnalysis,
}

fn compare_pair(
    task: TaskKind,
    scale: Scale,
    (baseline, baseline_times): (&str, &[f64]),
    (candidate, candidate_times): (&str, &[f64]),
    stats: &StatisticsConfig,
) -> LanguageComparison {
    let significance = calculate_significance(baseline_times, candidate_times, stats.significance_alpha);
    let cohens_d = calculate_effect_size(baseline_times, candidate_times);
    let effect_size = classify_effect_size(cohens_d, &stats.effect_size_thresholds);
    let baseline_stats = Summary::from_values(baseline_times);
    let candidate_stats = Summary::from_values(candidate_times);

    let faster = significance.is_significant.then(|| {
        if significance.mean_difference > 0.0 {
            candidate.to_string()
        } else {
            baseline.to_string()
        }
    });
    let recommendation = match &faster {
        Some(language) => {
            let slower = baseline_stats.mean.max(candidate_stats.mean);
            let gain = if slower > 0.0 {
                significance.mean_difference.abs() / slower * 100.0
            } else {
                0.0
            };
            format!(
                "{language} is faster by {gain:.1}% (p={:.4}, {:?} effect)",
                significance.p_value, effect_size
            )
        }
        None => format!(
            "no significant difference between {baseline} and {candidate} (p={:.4})",
            significance.p_value
        ),
    };

    LanguageComparison {
        task,
        scale,
        baseline: baseline.to_string(),
        candidate: candidate.to_string(),
        baseline_stats,
        candidate_stats,
        significance,
        cohens_d,
        effect_size,
        confidence_interval: confidence_interval(baseline_times, candidate_times, stats.confidence_level),
        faster,
        recommendation,
        power_analysis: validate_current_design(
            baseline_times,
            candidate_times,
            stats.minimum_detectable_effect,
            stats.significance_alpha,
            stats.target_power,
        ),
    }
}

/// Pairwise comparisons between every language measured on the same task x scale.
///
/// Times are outlier-cleaned with `qc`; groups with fewer than two clean
/// samples are skipped.
pub fn compare_languages(
    results: &[ExecutionResult],
    qc: &QcConfig,
    stats: &StatisticsConfig,
) -> Vec<LanguageComparison> {
    let mut by_task_scale: BTreeMap<(TaskKind, Scale), Vec<(&str, Vec<f64>)>> = BTreeMap::new();
    for ((task, scale, language), group) in group(results) {
        let (cleaned, _) = cleaned_times(&group, qc.outlier_iqr_multiplier);
        if cleaned.len() >= 2 {
            by_task_scale.entry((task, scale)).or_default().push((language, cleaned));
        }
    }

    let mut comparisons = Vec::new();
    for ((task, scale), languages) in by_task_scale {
        for (i, (baseline, baseline_times)) in languages.iter().enumerate() {
            for (candidate, candidate_times) in &languages[i + 1..] {
                comparisons.push(compare_pair(
                    task,
                    scale,
                    (*baseline, baseline_times.as_slice()),
                    (*candidate, candidate_times.as_slice()),
                    stats,
                ));
            }
        }
    }
    comparisons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;

    fn run(language: &str, iteration: u32, time: f64) -> ExecutionResult {
        ExecutionResult::success(TaskKind::MatrixMul, language, Scale::Micro, iteration, time, 65_536, 1)
    }

    fn series(language: &str, n: u32, base: f64) -> Vec<ExecutionResult> {
        (0..n).map(|i| run(language, i, base + (i % 5) as f64 * 0.01)).collect()
    }

    #[test]
    fn test_valid_group() {
        let reports = assess_quality(&series("rust", 30, 1.0), &QcConfig::default());
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.quality, DataQuality::Valid);
        assert_eq!(report.successful_runs, 30);
        assert_eq!(report.success_rate(), 1.0);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_failures_and_small_groups_are_invalid() {
        let mut results = series("rust", 30, 1.0);
        for i in 0..5 {
            results.push(ExecutionResult::failure(
                TaskKind::MatrixMul,
                "rust",
                Scale::Micro,
                30 + i,
                &BenchError::Timeout { duration_ms: 10 },
            ));
        }
        let report = &assess_quality(&results, &QcConfig::default())[0];
        assert_eq!(report.quality, DataQuality::Invalid);
        assert!(report.issues.iter().any(|i| i.contains("failure rate")));

        let report = &assess_quality(&series("c", 5, 1.0), &QcConfig::default())[0];
        assert_eq!(report.quality, DataQuality::Invalid);
        assert!(report.issues[0].contains("insufficient samples"));
    }

    #[test]
    fn test_high_variability_warns() {
        let results: Vec<ExecutionResult> = (0..30)
            .map(|i| run("rust", i, if i % 2 == 0 { 1.0 } else { 1.5 }))
            .collect();
        let report = &assess_quality(&results, &QcConfig::default())[0];
        assert_eq!(report.quality, DataQuality::Warning);
    }

    #[test]
    fn test_comparison_names_faster_language() {
        let mut results = series("rust", 30, 1.0);
        results.extend(series("c", 30, 2.0));
        let comparisons = compare_languages(&results, &QcConfig::default(), &StatisticsConfig::default());
        assert_eq!(comparisons.len(), 1);
        let cmp = &comparisons[0];
        assert_eq!(cmp.faster.as_deref(), Some("rust"));
        assert_eq!(cmp.effect_size, EffectSize::Large);
        assert!(cmp.recommendation.starts_with("rust is faster"));
    }

    #[test]
    fn test_comparison_carries_power_analysis() {
        use crate::stats::Recommendation;

        let mut results = series("rust", 30, 1.0);
        results.extend(series("c", 30, 2.0));
        let mut stats = StatisticsConfig {
            minimum_detectable_effect: 0.6,
            ..StatisticsConfig::default()
        };

        let cmp = &compare_languages(&results, &QcConfig::default(), &stats)[0];
        let analysis = cmp.power_analysis.result().unwrap();
        assert_eq!(analysis.current_sample_size, 30);
        assert!(matches!(
            analysis.recommendation,
            Recommendation::IncreaseSampleSize { .. }
        ));

        stats.target_power = 0.6;
        let cmp = &compare_languages(&results, &QcConfig::default(), &stats)[0];
        assert_eq!(
            cmp.power_analysis.result().unwrap().recommendation,
            Recommendation::Sufficient
        );
    }

    #[test]
    fn test_no_difference_has_no_winner() {
        let mut results = series("rust", 30, 1.0);
        results.extend(series("c", 30, 1.0));
        let cmp = &compare_languages(&results, &QcConfig::default(), &StatisticsConfig::default())[0];
        assert!(cmp.faster.is_none());
        assert!(cmp.recommendation.starts_with("no significant difference"));
    }
}
