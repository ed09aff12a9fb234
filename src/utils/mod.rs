//! Utilities shared by the tasks, the executor and the CLI.

pub mod cpu_affinity;
pub mod tui;

pub use cpu_affinity::CpuPinGuard;

/// C compiler name detected at build time
pub const C_COMPILER_NAME: Option<&str> = option_env!("C_COMPILER_NAME");

/// One language implementation of a task.
/// Generic over F which is the function signature.
pub struct VariantInfo<F> {
    /// Language identifier (e.g., "rust", "c")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// The specific implementation function
    pub function: F,
}
