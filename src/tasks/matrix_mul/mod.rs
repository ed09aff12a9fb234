//! # Matrix Multiplication
//!
//! Generates two `dimension x dimension` matrices from a single LCG stream
//! (A first, then B), computes `C = A x B` with the naive triple loop in
//! i, j, k order and hashes C row-major after rounding every element to six
//! decimals.
//!
//! Summation order is part of the contract: every implementation must
//! accumulate in the same order with separately rounded `f32` multiply and
//! add (no fused multiply-add, no reassociation).

pub mod code;
pub mod test;

pub use code::*;

use crate::params::{MatrixMulParams, TaskKind};
use crate::registry::{RunTaskFn, TaskRunner};
use crate::utils::VariantInfo;
use crate::verify::VerificationVector;

/// Runner for the matrix multiplication task
pub struct MatrixMulRunner;

impl TaskRunner for MatrixMulRunner {
    fn kind(&self) -> TaskKind {
        TaskKind::MatrixMul
    }

    fn description(&self) -> &'static str {
        "Dense f32 matrix product with naive i,j,k loop order"
    }

    fn category(&self) -> &'static str {
        "numeric"
    }

    fn implementations(&self) -> Vec<VariantInfo<RunTaskFn>> {
        code::available_variants()
    }

    fn reference_vectors(&self) -> Vec<VerificationVector> {
        reference_cases()
            .into_iter()
            .map(|(name, description, category, params)| {
                VerificationVector::new(name, description, category, params.into(), compute_hash(&params))
            })
            .collect()
    }
}

/// (name, description, category, params) for every reference vector
pub fn reference_cases() -> Vec<(String, String, &'static str, MatrixMulParams)> {
    let groups: [(&str, &[(&str, u32, u32)]); 4] = [
        (
            "small_matrices",
            &[
                ("small_2x2", 2, 12345),
                ("small_3x3", 3, 54321),
                ("small_4x4", 4, 98765),
                ("small_8x8", 8, 11111),
            ],
        ),
        (
            "medium_matrices",
            &[
                ("medium_16x16", 16, 12345),
                ("medium_32x32", 32, 67890),
                ("medium_64x64", 64, 24680),
                ("medium_128x128", 128, 13579),
            ],
        ),
        (
            "edge_cases",
            &[
                ("single_element_zero_seed", 1, 0),
                ("single_element", 1, 12345),
                ("small_2x2_zero_seed", 2, 0),
                ("max_seed_16x16", 16, u32::MAX),
                ("invalid_zero_dimension", 0, 12345),
                ("invalid_oversized", 2001, 12345),
            ],
        ),
        (
            "seed_variations",
            &[
                ("seed_1", 16, 1),
                ("seed_42", 16, 42),
                ("seed_1337", 16, 1337),
                ("seed_999999", 16, 999_999),
                ("seed_2147483647", 16, 2_147_483_647),
            ],
        ),
    ];

    groups
        .into_iter()
        .flat_map(|(category, cases)| {
            cases.iter().map(move |&(name, dimension, seed)| {
                (
                    name.to_string(),
                    format!("{dimension}x{dimension}, seed={seed}"),
                    category,
                    MatrixMulParams { dimension, seed },
                )
            })
        })
        .collect()
}
