//! Matrix multiplication implementations.

pub mod c_impl;
mod original;

pub use c_impl::{matrix_mul_c_run_task, C_IMPL_AVAILABLE};
pub use original::{
    compute_hash, generate_matrices, hash_matrix, matrix_mul_run_task, multiply, Matrix,
    FLOAT_RANGE_MAX, FLOAT_RANGE_MIN,
};

use crate::registry::RunTaskFn;
use crate::utils::VariantInfo;

/// Get all language implementations compiled into this build
pub fn available_variants() -> Vec<VariantInfo<RunTaskFn>> {
    let mut variants: Vec<VariantInfo<RunTaskFn>> = vec![VariantInfo {
        name: "rust",
        description: "Rust naive i,j,k product over row-major storage",
        function: matrix_mul_run_task,
    }];

    if C_IMPL_AVAILABLE {
        variants.push(VariantInfo {
            name: "c",
            description: "C naive i,j,k product built without fp contraction",
            function: matrix_mul_c_run_task,
        });
    }

    variants
}
