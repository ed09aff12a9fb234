//! # Crosslang-Bench
//!
//! Runs equivalent benchmark tasks implemented in several languages, proves
//! they compute bit-identical results through a shared hash oracle, and
//! decides whether their timing differences are statistically meaningful.

pub mod codec;
pub mod config;
pub mod datagen;
pub mod error;
pub mod executor;
pub mod hash;
pub mod module;
pub mod orchestrator;
pub mod params;
pub mod random;
pub mod registry;
pub mod results;
pub mod stats;
pub mod tasks;
pub mod utils;
pub mod verify;

/// Re-export tui from utils
pub use utils::tui;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::config::BenchConfig;
    pub use crate::datagen::{Scale, TestDataGenerator};
    pub use crate::error::{BenchError, ErrorKind, Result};
    pub use crate::module::{ModuleLoader, NativeLoader, TaskModule};
    pub use crate::orchestrator::{Orchestrator, OrchestratorState};
    pub use crate::params::{TaskKind, TaskParams};
    pub use crate::registry::{build_registry, TaskRegistry, TaskRunner};
    pub use crate::results::ExecutionResult;
    pub use crate::verify::{verify_implementation, VerificationVector};
}
