//! Cross-implementation verification.
//!
//! A [`VerificationVector`] pairs task parameters with the hash the reference
//! implementation produced for them. Candidates are checked by recomputing
//! the hash and comparing for exact equality. The one sanctioned relaxation:
//! matrix products larger than [`CRITICAL_MATRIX_DIMENSION`] may mismatch
//! without failing a suite, since summation rounding can legitimately
//! diverge between optimizing compilers.

use crate::datagen::{Scale, TestDataGenerator};
use crate::error::Result;
use crate::params::{TaskKind, TaskParams};
use crate::results::ExecutionResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Matrix dimensions up to this bound must match exactly
pub const CRITICAL_MATRIX_DIMENSION: u32 = 4;

/// Reference fixture: params and the hash the reference implementation returned
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationVector {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub params: TaskParams,
    pub expected_hash: u32,
    pub category: String,
}

impl VerificationVector {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        params: TaskParams,
        expected_hash: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
            expected_hash,
            category: category.into(),
        }
    }

    /// Whether a mismatch on this vector fails the suite
    pub fn is_critical(&self) -> bool {
        is_critical(&self.params)
    }
}

/// Exact match is required everywhere except for larger matrix products
pub fn is_critical(params: &TaskParams) -> bool {
    match params {
        TaskParams::MatrixMul(p) => p.dimension <= CRITICAL_MATRIX_DIMENSION,
        _ => true,
    }
}

/// Fixture file: one task's vectors as produced by one reference language
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    pub task: TaskKind,
    pub reference_language: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub vectors: Vec<VerificationVector>,
}

impl FixtureSet {
    pub fn new(task: TaskKind, reference_language: impl Into<String>, vectors: Vec<VerificationVector>) -> Self {
        Self {
            task,
            reference_language: reference_language.into(),
            generated_at: chrono::Utc::now(),
            vectors,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let set: Self = serde_json::from_str(&text)?;
        debug!(task = %set.task, vectors = set.vectors.len(), path = %path.as_ref().display(), "loaded fixtures");
        Ok(set)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(task = %self.task, path = %path.display(), "saved fixtures");
        Ok(())
    }
}

/// Result of checking one vector
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VectorOutcome {
    pub name: String,
    pub category: String,
    pub params: TaskParams,
    pub expected_hash: u32,
    pub actual_hash: Option<u32>,
    pub error: Option<String>,
    pub critical: bool,
}

impl VectorOutcome {
    pub fn passed(&self) -> bool {
        self.actual_hash == Some(self.expected_hash)
    }

    /// Hash or error text for messages
    pub fn describe_actual(&self) -> String {
        match (&self.actual_hash, &self.error) {
            (Some(hash), _) => format!("{hash:#010x}"),
            (None, Some(error)) => format!("error: {error}"),
            (None, None) => "nothing".to_string(),
        }
    }
}

/// Per-vector outcomes for one candidate implementation
#[derive(Clone, Debug, Serialize)]
pub struct VerificationReport {
    pub task: TaskKind,
    pub language: String,
    pub outcomes: Vec<VectorOutcome>,
}

impl VerificationReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn critical_failures(&self) -> impl Iterator<Item = &VectorOutcome> {
        self.outcomes.iter().filter(|o| o.critical && !o.passed())
    }

    /// Mismatches that are allowed by policy
    pub fn tolerated_failures(&self) -> impl Iterator<Item = &VectorOutcome> {
        self.outcomes.iter().filter(|o| !o.critical && !o.passed())
    }

    /// The suite passes when no critical vector failed
    pub fn is_success(&self) -> bool {
        self.critical_failures().next().is_none()
    }

    /// Pass counts per category, in name order
    pub fn by_category(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            let entry = counts.entry(outcome.category.as_str()).or_insert((0, 0));
            if outcome.passed() {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
        counts
    }
}

/// Check a candidate's compute function against every vector.
///
/// `compute` receives decoded params; errors count as failures.
pub fn verify_implementation<F>(
    task: TaskKind,
    language: &str,
    vectors: &[VerificationVector],
    mut compute: F,
) -> VerificationReport
where
    F: FnMut(&TaskParams) -> Result<u32>,
{
    let outcomes = vectors
        .iter()
        .map(|vector| {
            let (actual_hash, error) = match compute(&vector.params) {
                Ok(hash) => (Some(hash), None),
                Err(e) => (None, Some(e.to_string())),
            };
            let outcome = VectorOutcome {
                name: vector.name.clone(),
                category: vector.category.clone(),
                params: vector.params,
                expected_hash: vector.expected_hash,
                actual_hash,
                error,
                critical: vector.is_critical(),
            };
            if !outcome.passed() {
                warn!(
                    task = %task,
                    language,
                    vector = %outcome.name,
                    params = ?outcome.params,
                    expected = outcome.expected_hash,
                    actual = %outcome.describe_actual(),
                    tolerated = !outcome.critical,
                    "hash mismatch"
                );
            }
            outcome
        })
        .collect();

    VerificationReport {
        task,
        language: language.to_string(),
        outcomes,
    }
}

/// Successful samples of one task x language x scale that disagree on the hash
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsistencyIssue {
    pub task: TaskKind,
    pub language: String,
    pub scale: Scale,
    pub distinct_hashes: Vec<u32>,
}

/// Languages disagreeing on the hash for one task x scale
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HashMismatch {
    pub task: TaskKind,
    pub scale: Scale,
    /// Parameters every language ran with
    pub params: TaskParams,
    /// (language, hash) for every language with a consistent hash
    pub hashes: Vec<(String, u32)>,
    /// Large matrix products are allowed to diverge
    pub tolerated: bool,
}

/// Output of [`validate_results`]
#[derive(Clone, Debug, Default, Serialize)]
pub struct ResultValidation {
    pub consistency_issues: Vec<ConsistencyIssue>,
    pub mismatches: Vec<HashMismatch>,
}

impl ResultValidation {
    pub fn is_clean(&self) -> bool {
        self.consistency_issues.is_empty() && self.mismatches.iter().all(|m| m.tolerated)
    }
}

/// Check internal hash consistency per series and hash agreement across languages.
///
/// `seed` is the run seed the series payloads were generated from.
pub fn validate_results(results: &[ExecutionResult], seed: u32) -> ResultValidation {
    let mut series: BTreeMap<(TaskKind, Scale, &str), Vec<u32>> = BTreeMap::new();
    for result in results.iter().filter(|r| r.success) {
        let hashes = series
            .entry((result.task, result.scale, result.language.as_str()))
            .or_default();
        if !hashes.contains(&result.result_hash) {
            hashes.push(result.result_hash);
        }
    }

    let mut validation = ResultValidation::default();
    let mut by_task_scale: BTreeMap<(TaskKind, Scale), Vec<(String, u32)>> = BTreeMap::new();

    for ((task, scale, language), hashes) in series {
        if hashes.len() > 1 {
            warn!(task = %task, scale = %scale, language, ?hashes, "inconsistent hashes within one series");
            validation.consistency_issues.push(ConsistencyIssue {
                task,
                language: language.to_string(),
                scale,
                distinct_hashes: hashes,
            });
        } else {
            by_task_scale
                .entry((task, scale))
                .or_default()
                .push((language.to_string(), hashes[0]));
        }
    }

    for ((task, scale), hashes) in by_task_scale {
        let first = hashes[0].1;
        if hashes.iter().any(|&(_, hash)| hash != first) {
            let tolerated = task == TaskKind::MatrixMul
                && scale.matrix_dimension() > CRITICAL_MATRIX_DIMENSION;
            warn!(task = %task, scale = %scale, ?hashes, tolerated, "cross-language hash mismatch");
            validation.mismatches.push(HashMismatch {
                task,
                scale,
                params: TestDataGenerator::new(seed).generate(task, scale),
                hashes,
                tolerated,
            });
        }
    }

    validation
}
