//! Tests for the matrix multiplication implementations.

#[cfg(test)]
mod tests {
    use crate::codec;
    use crate::hash::round_f32_to_precision;
    use crate::params::MatrixMulParams;
    use crate::tasks::matrix_mul::code::*;

    #[test]
    fn test_generation_threads_one_stream() {
        let (a, b) = generate_matrices(2, 12345);
        assert_eq!(a.as_slice()[0] as f64, -0.9591946005821228);
        assert_eq!(a.as_slice()[1] as f64, -0.9669042825698853);
        // B continues where A stopped
        assert_eq!(b.as_slice()[0] as f64, 0.8200590014457703);
        for value in a.as_slice().iter().chain(b.as_slice()) {
            assert!((FLOAT_RANGE_MIN..=FLOAT_RANGE_MAX).contains(value));
        }
    }

    #[test]
    fn test_small_2x2_product() {
        let (a, b) = generate_matrices(2, 12345);
        let c = multiply(&a, &b);
        let rounded: Vec<i32> = c.as_slice().iter().map(|&v| round_f32_to_precision(v, 6)).collect();
        assert_eq!(rounded, vec![-778_647, 649_952, 68_562, -40_808]);
    }

    #[test]
    fn test_multiply_known_product() {
        let a = Matrix::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::from_vec(2, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(multiply(&a, &b).as_slice(), &[19.0, 22.0, 43.0, 50.0]);
        assert_eq!(multiply(&a, &Matrix::zeros(2)), Matrix::zeros(2));
        assert_eq!(multiply(&a, &b).get(1, 0), 43.0);
    }

    #[test]
    fn test_golden_hashes() {
        let hash = |dimension, seed| compute_hash(&MatrixMulParams { dimension, seed });
        // small_2x2 reference vector
        assert_eq!(hash(2, 12345), 1_708_139_940);
        assert_eq!(hash(1, 0), 2_473_609_544);
        assert_eq!(hash(3, 54321), 2_319_415_099);
        assert_eq!(hash(16, 12345), 369_100_581);
    }

    #[test]
    fn test_loop_order_matters_for_hash() {
        let (a, b) = generate_matrices(4, 98765);
        assert_ne!(hash_matrix(&multiply(&a, &b)), hash_matrix(&multiply(&b, &a)));
    }

    #[test]
    fn test_invalid_dimensions_hash_zero() {
        assert_eq!(compute_hash(&MatrixMulParams { dimension: 0, seed: 1 }), 0);
        assert_eq!(compute_hash(&MatrixMulParams { dimension: 2001, seed: 1 }), 0);
        assert_eq!(matrix_mul_run_task(&[2, 0, 0, 0]), 0);
    }

    #[test]
    fn test_c_matches_rust() {
        if !C_IMPL_AVAILABLE {
            return;
        }
        for (dimension, seed) in [(1, 0), (2, 12345), (4, 98765), (16, u32::MAX), (0, 1)] {
            let bytes = codec::encode(&MatrixMulParams { dimension, seed }.into());
            assert_eq!(matrix_mul_c_run_task(&bytes), matrix_mul_run_task(&bytes));
        }
    }
}
