//! Task registry for dynamic task discovery and verification.
//!
//! Every benchmark task registers one runner that knows its language
//! implementations and its reference vector suite.

use crate::codec;
use crate::params::{TaskKind, TaskParams};
use crate::utils::VariantInfo;
use crate::verify::{self, VerificationVector};

/// ABI entry point of a language implementation: encoded params in, hash out
pub type RunTaskFn = fn(&[u8]) -> u32;

/// Language whose implementation produces the reference hashes
pub const REFERENCE_LANGUAGE: &str = "rust";

/// Trait that all benchmark tasks must implement
pub trait TaskRunner: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Name of the task (e.g., "matrix_mul")
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Category (e.g., "numeric", "parsing")
    fn category(&self) -> &'static str;

    /// Language implementations compiled into this build
    fn implementations(&self) -> Vec<VariantInfo<RunTaskFn>>;

    /// Get list of available language names
    fn available_languages(&self) -> Vec<&'static str> {
        self.implementations().iter().map(|v| v.name).collect()
    }

    /// Look up one language implementation
    fn implementation(&self, language: &str) -> Option<RunTaskFn> {
        self.implementations()
            .into_iter()
            .find(|v| v.name == language)
            .map(|v| v.function)
    }

    /// Reference vectors with hashes produced by [`REFERENCE_LANGUAGE`]
    fn reference_vectors(&self) -> Vec<VerificationVector>;

    /// Verify every implementation against the reference vectors.
    ///
    /// Non-critical mismatches (large matrices) are tolerated, but each
    /// implementation must still be deterministic on them.
    fn verify(&self) -> Result<(), String> {
        let vectors = self.reference_vectors();
        if vectors.is_empty() {
            return Err(format!("Task '{}' has no reference vectors", self.name()));
        }

        for variant in self.implementations() {
            let function = variant.function;
            let report = verify::verify_implementation(
                self.kind(),
                variant.name,
                &vectors,
                |params: &TaskParams| Ok(function(&codec::encode(params))),
            );

            if let Some(failure) = report.critical_failures().next() {
                return Err(format!(
                    "Language '{}' failed vector '{}': expected {:#010x}, got {}",
                    variant.name,
                    failure.name,
                    failure.expected_hash,
                    failure.describe_actual()
                ));
            }

            for outcome in report.tolerated_failures() {
                let encoded = codec::encode(&outcome.params);
                let first = function(&encoded);
                let second = function(&encoded);
                if first != second {
                    return Err(format!(
                        "Language '{}' is not deterministic on '{}': {:#010x} vs {:#010x}",
                        variant.name, outcome.name, first, second
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Registry of all benchmark tasks
pub struct TaskRegistry {
    tasks: Vec<Box<dyn TaskRunner>>,
}

impl TaskRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task
    pub fn register<T: TaskRunner + 'static>(&mut self, task: T) {
        self.tasks.push(Box::new(task));
    }

    /// Get all registered tasks
    pub fn all(&self) -> &[Box<dyn TaskRunner>] {
        &self.tasks
    }

    /// Find task by kind
    pub fn find(&self, kind: TaskKind) -> Option<&dyn TaskRunner> {
        self.tasks
            .iter()
            .find(|t| t.kind() == kind)
            .map(|t| t.as_ref())
    }

    /// List task names
    pub fn list_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// List tasks by category
    pub fn by_category(&self, category: &str) -> Vec<&dyn TaskRunner> {
        self.tasks
            .iter()
            .filter(|t| t.category() == category)
            .map(|t| t.as_ref())
            .collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default registry with all tasks
pub fn build_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();

    registry.register(crate::tasks::mandelbrot::MandelbrotRunner);
    registry.register(crate::tasks::json_parse::JsonParseRunner);
    registry.register(crate::tasks::matrix_mul::MatrixMulRunner);

    registry
}
