//! Reference matrix generation and multiplication.

use crate::codec;
use crate::hash::fnv1a_hash_f32_rounded;
use crate::params::MatrixMulParams;
use crate::random::Lcg;

pub const FLOAT_RANGE_MIN: f32 = -1.0;
pub const FLOAT_RANGE_MAX: f32 = 1.0;

/// Square row-major `f32` matrix
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    dimension: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            data: vec![0.0; dimension * dimension],
        }
    }

    /// Wrap row-major data; panics unless `data.len() == dimension^2`
    pub fn from_vec(dimension: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), dimension * dimension, "matrix data must be square");
        Self { dimension, data }
    }

    /// Fill row by row from the LCG stream, mapped into [-1, 1]
    pub fn random(dimension: usize, lcg: &mut Lcg) -> Self {
        let data = (0..dimension * dimension)
            .map(|_| lcg.next_f32(FLOAT_RANGE_MIN, FLOAT_RANGE_MAX))
            .collect();
        Self { dimension, data }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.dimension + col]
    }

    /// Elements in row-major order
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// ABI entry point: decode the parameter buffer, multiply, hash
pub fn matrix_mul_run_task(params: &[u8]) -> u32 {
    match codec::decode_matrix_mul(params) {
        Ok(params) => compute_hash(&params),
        Err(_) => 0,
    }
}

/// Hash of `A x B` where A then B are drawn from one LCG stream seeded with
/// `params.seed`; `0` for invalid params
pub fn compute_hash(params: &MatrixMulParams) -> u32 {
    if params.validate().is_err() {
        return 0;
    }
    let (a, b) = generate_matrices(params.dimension as usize, params.seed);
    hash_matrix(&multiply(&a, &b))
}

pub fn generate_matrices(dimension: usize, seed: u32) -> (Matrix, Matrix) {
    let mut lcg = Lcg::new(seed);
    let a = Matrix::random(dimension, &mut lcg);
    let b = Matrix::random(dimension, &mut lcg);
    (a, b)
}

/// Naive product in i, j, k order.
///
/// Each `c[i][j]` accumulates `a[i][k] * b[k][j]` for increasing `k` in
/// `f32`, starting from zero. Changing the loop order changes the hash.
pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    assert_eq!(a.dimension, b.dimension, "matrix dimensions must match");
    let n = a.dimension;
    let mut c = Matrix::zeros(n);

    for i in 0..n {
        let a_row = &a.data[i * n..(i + 1) * n];
        for j in 0..n {
            let mut sum = 0.0f32;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += a_ik * b.data[k * n + j];
            }
            c.data[i * n + j] = sum;
        }
    }

    c
}

/// FNV-1a over the elements rounded to 6 decimals, row-major
pub fn hash_matrix(matrix: &Matrix) -> u32 {
    fnv1a_hash_f32_rounded(matrix.data.iter().copied())
}
