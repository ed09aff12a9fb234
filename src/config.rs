//! Benchmark configuration.
//!
//! Every option has a default, so an empty JSON object is a complete
//! configuration. Keys are camelCase.

use crate::datagen::Scale;
use crate::error::{BenchError, Result};
use crate::params::TaskKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BenchConfig {
    pub tasks: Vec<TaskKind>,
    pub languages: Vec<String>,
    pub scales: Vec<Scale>,
    pub seed: u32,
    pub warmup_runs: u32,
    pub measure_runs: u32,
    pub timeout_ms: u64,
    pub parallel: bool,
    pub max_parallel: usize,
    /// Failure rate above which the suite aborts
    pub failure_threshold: f64,
    /// Completed runs required before the failure rate is checked
    pub failure_check_min_runs: usize,
    /// Shuffle the combination schedule, seeded from `seed`
    pub randomize_order: bool,
    pub pin_cpu: bool,
    /// Directory with `<task>-<language>.wasm` modules
    pub wasm_dir: Option<PathBuf>,
    pub qc: QcConfig,
    pub statistics: StatisticsConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            tasks: TaskKind::ALL.to_vec(),
            languages: vec!["rust".to_string(), "c".to_string()],
            scales: vec![Scale::Micro, Scale::Small],
            seed: 12345,
            warmup_runs: 3,
            measure_runs: 30,
            timeout_ms: 30_000,
            parallel: false,
            max_parallel: 4,
            failure_threshold: 0.5,
            failure_check_min_runs: 10,
            randomize_order: false,
            pin_cpu: true,
            wasm_dir: None,
            qc: QcConfig::default(),
            statistics: StatisticsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct QcConfig {
    pub max_coefficient_variation: f64,
    pub extreme_coefficient_variation: f64,
    pub outlier_iqr_multiplier: f64,
    pub min_valid_samples: usize,
    pub max_failure_rate: f64,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            max_coefficient_variation: 0.15,
            extreme_coefficient_variation: 1.0,
            outlier_iqr_multiplier: 1.5,
            min_valid_samples: 30,
            max_failure_rate: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StatisticsConfig {
    pub significance_alpha: f64,
    pub confidence_level: f64,
    pub target_power: f64,
    pub effect_size_thresholds: EffectSizeThresholds,
    pub minimum_detectable_effect: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            significance_alpha: 0.05,
            confidence_level: 0.95,
            target_power: 0.8,
            effect_size_thresholds: EffectSizeThresholds::default(),
            minimum_detectable_effect: 0.3,
        }
    }
}

/// Cohen's d boundaries for small, medium and large effects
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectSizeThresholds {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl Default for EffectSizeThresholds {
    fn default() -> Self {
        Self {
            small: 0.3,
            medium: 0.6,
            large: 1.0,
        }
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(BenchError::config(format!("{name} must be in (0, 1), got {value}")))
    }
}

fn fraction(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BenchError::config(format!("{name} must be in [0, 1], got {value}")))
    }
}

impl BenchConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BenchError::config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| BenchError::config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(BenchError::config("no tasks configured"));
        }
        if self.languages.is_empty() {
            return Err(BenchError::config("no languages configured"));
        }
        if self.scales.is_empty() {
            return Err(BenchError::config("no scales configured"));
        }
        if self.measure_runs == 0 {
            return Err(BenchError::config("measureRuns must be at least 1"));
        }
        if self.max_parallel == 0 {
            return Err(BenchError::config("maxParallel must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(BenchError::config("timeoutMs must be at least 1"));
        }
        // xorshift state 0 never leaves 0, so every generated param would collapse
        if self.seed == 0 {
            return Err(BenchError::config("seed must be non-zero"));
        }
        fraction("failureThreshold", self.failure_threshold)?;
        fraction("qc.maxFailureRate", self.qc.max_failure_rate)?;
        if self.qc.max_coefficient_variation < 0.0 || self.qc.extreme_coefficient_variation < 0.0 {
            return Err(BenchError::config("coefficient of variation thresholds must not be negative"));
        }
        if self.qc.outlier_iqr_multiplier <= 0.0 {
            return Err(BenchError::config("qc.outlierIqrMultiplier must be positive"));
        }

        let stats = &self.statistics;
        unit_interval("statistics.significanceAlpha", stats.significance_alpha)?;
        unit_interval("statistics.confidenceLevel", stats.confidence_level)?;
        unit_interval("statistics.targetPower", stats.target_power)?;
        let t = stats.effect_size_thresholds;
        if !(0.0 < t.small && t.small <= t.medium && t.medium <= t.large) {
            return Err(BenchError::config(
                "effect size thresholds must be positive and ordered small <= medium <= large",
            ));
        }
        if stats.minimum_detectable_effect <= 0.0 {
            return Err(BenchError::config("statistics.minimumDetectableEffect must be positive"));
        }
        Ok(())
    }

    /// Measured invocations in a full run
    pub fn total_runs(&self) -> usize {
        self.combinations() * self.measure_runs as usize
    }

    /// Number of task x language x scale series
    pub fn combinations(&self) -> usize {
        self.tasks.len() * self.languages.len() * self.scales.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = BenchConfig::from_json("{}").unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(config.total_runs(), 3 * 2 * 2 * 30);
    }

    #[test]
    fn test_partial_override() {
        let config = BenchConfig::from_json(
            r#"{
                "tasks": ["matrix_mul"],
                "scales": ["micro", "large"],
                "measureRuns": 5,
                "parallel": true,
                "qc": { "minValidSamples": 5 },
                "statistics": { "effectSizeThresholds": { "large": 1.5 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.tasks, vec![TaskKind::MatrixMul]);
        assert_eq!(config.scales, vec![Scale::Micro, Scale::Large]);
        assert_eq!(config.measure_runs, 5);
        assert!(config.parallel);
        assert_eq!(config.warmup_runs, 3);
        assert_eq!(config.qc.min_valid_samples, 5);
        assert_eq!(config.qc.max_failure_rate, 0.1);
        assert_eq!(config.statistics.effect_size_thresholds.large, 1.5);
        assert_eq!(config.statistics.effect_size_thresholds.small, 0.3);
    }

    #[test]
    fn test_rejections() {
        for bad in [
            r#"{"tasks": []}"#,
            r#"{"measureRuns": 0}"#,
            r#"{"maxParallel": 0}"#,
            r#"{"timeoutMs": 0}"#,
            r#"{"seed": 0}"#,
            r#"{"failureThreshold": 1.5}"#,
            r#"{"statistics": {"significanceAlpha": 0}}"#,
            r#"{"statistics": {"targetPower": 1.0}}"#,
            r#"{"statistics": {"effectSizeThresholds": {"small": 0.8}}}"#,
            r#"{"tasks": ["sorting"]}"#,
            r#"{"warmupRun": 3}"#,
        ] {
            let err = BenchConfig::from_json(bad).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Config, "{bad}");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, r#"{"seed": 7, "languages": ["rust"]}"#).unwrap();
        let config = BenchConfig::load(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.languages, vec!["rust"]);
        assert!(BenchConfig::load(dir.path().join("missing.json")).is_err());
    }
}
