//! Mandelbrot implementations.
//!
//! One module per language; every variant takes the encoded parameter buffer
//! and returns the verification hash.

pub mod c_impl;
mod original;

pub use c_impl::{mandelbrot_c_run_task, C_IMPL_AVAILABLE};
pub use original::{compute_hash, escape_iterations, mandelbrot_run_task, render, DIVERGENCE_THRESHOLD};

use crate::registry::RunTaskFn;
use crate::utils::VariantInfo;

/// Get all language implementations compiled into this build
pub fn available_variants() -> Vec<VariantInfo<RunTaskFn>> {
    let mut variants: Vec<VariantInfo<RunTaskFn>> = vec![VariantInfo {
        name: "rust",
        description: "Rust reference renderer",
        function: mandelbrot_run_task,
    }];

    if C_IMPL_AVAILABLE {
        variants.push(VariantInfo {
            name: "c",
            description: "C renderer built without fp contraction",
            function: mandelbrot_c_run_task,
        });
    }

    variants
}
