//! Error types for benchmark orchestration.
//!
//! The compute path never produces these: invalid parameters collapse to hash
//! `0` and failed allocations to pointer `0`. Errors only exist at the
//! orchestration layer (module loading, timeouts, configuration, I/O).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while loading, executing or reporting on task modules
#[derive(Debug, Error)]
pub enum BenchError {
    /// Configuration is missing or out of range (fatal for the whole run)
    #[error("Invalid configuration: {reason}")]
    Config {
        /// What is wrong
        reason: String,
    },

    /// I/O error while reading modules, fixtures or writing results
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },

    /// A module could not be fetched or instantiated
    #[error("Failed to load {language} module for {task}: {reason}")]
    ModuleLoad {
        /// Task name
        task: String,
        /// Language implementation name
        language: String,
        /// Reason for failure
        reason: String,
    },

    /// A module does not expose one of the required ABI exports
    #[error("Module is missing required export `{name}`")]
    MissingExport {
        /// Export name
        name: &'static str,
    },

    /// `alloc` returned the null pointer
    #[error("Module allocation of {requested} bytes failed")]
    Allocation {
        /// Requested size in bytes
        requested: u32,
    },

    /// Parameters failed validation before reaching a module
    #[error("Invalid parameters for {task}: {reason}")]
    InvalidParams {
        /// Task name
        task: &'static str,
        /// Reason for rejection
        reason: String,
    },

    /// A parameter buffer was shorter than its fixed layout
    #[error("Parameter buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Required buffer size
        expected: usize,
        /// Actual buffer size
        actual: usize,
    },

    /// Task invocation exceeded its time budget
    #[error("Task timed out after {duration_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// The module trapped or returned an unusable result
    #[error("Execution failed: {reason}")]
    Execution {
        /// Reason for failure
        reason: String,
    },

    /// The run was cancelled before this work started
    #[error("Benchmark run cancelled")]
    Cancelled,

    /// An orchestrator operation was called in the wrong state
    #[error("Invalid orchestrator state: {state}")]
    InvalidState {
        /// Current state description
        state: String,
    },
}

impl BenchError {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a module load error
    pub fn module_load(
        task: impl Into<String>,
        language: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ModuleLoad {
            task: task.into(),
            language: language.into(),
            reason: reason.into(),
        }
    }

    /// Create an execution error
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Stable classification used in result records
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } | Self::Json { .. } => ErrorKind::Io,
            Self::ModuleLoad { .. } | Self::MissingExport { .. } => ErrorKind::ModuleLoad,
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::InvalidParams { .. } | Self::BufferTooShort { .. } => ErrorKind::InvalidParams,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Execution { .. } | Self::InvalidState { .. } => ErrorKind::Execution,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the orchestrator may continue with the next combination
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }
}

/// Error category recorded in failed results (`errorType`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    ModuleLoad,
    Allocation,
    InvalidParams,
    Execution,
    Cancelled,
    Config,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::ModuleLoad => "module_load",
            Self::Allocation => "allocation",
            Self::InvalidParams => "invalid_params",
            Self::Execution => "execution",
            Self::Cancelled => "cancelled",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BenchError::Timeout { duration_ms: 10 }.kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            BenchError::MissingExport { name: "run_task" }.kind(),
            ErrorKind::ModuleLoad
        );
        assert_eq!(BenchError::config("x").kind(), ErrorKind::Config);
        assert!(!BenchError::config("x").is_recoverable());
        assert!(BenchError::module_load("matrix_mul", "c", "missing").is_recoverable());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ModuleLoad).unwrap();
        assert_eq!(json, "\"module_load\"");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }
}
