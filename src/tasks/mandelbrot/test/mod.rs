//! Tests for the Mandelbrot implementations.

#[cfg(test)]
mod tests {
    use crate::codec;
    use crate::hash::{fnv1a_hash_u32, FNV_OFFSET_BASIS};
    use crate::params::MandelbrotParams;
    use crate::tasks::mandelbrot::code::*;

    fn params(width: u32, height: u32, max_iter: u32, center: (f64, f64), scale: f64) -> MandelbrotParams {
        MandelbrotParams {
            width,
            height,
            max_iter,
            center_real: center.0,
            center_imag: center.1,
            scale_factor: scale,
        }
    }

    #[test]
    fn test_known_points() {
        assert_eq!(escape_iterations(0.0, 0.0, 1000), 1000, "origin is in the set");
        assert!(escape_iterations(2.0, 2.0, 1000) < 10);
        assert!(escape_iterations(-0.75, 0.0, 1000) > 100);
        // |z|^2 is checked before stepping, so the first step always happens
        assert_eq!(escape_iterations(100.0, 100.0, 50), 1);
        assert_eq!(escape_iterations(100.0, 100.0, 0), 0);
    }

    #[test]
    fn test_render_4x4_counts() {
        let counts = render(&params(4, 4, 10, (0.0, 0.0), 4.0));
        assert_eq!(counts, vec![1, 1, 2, 1, 1, 3, 10, 2, 10, 10, 10, 3, 1, 3, 10, 2]);
    }

    #[test]
    fn test_hash_is_fnv_over_counts() {
        let p = params(4, 4, 10, (0.0, 0.0), 4.0);
        assert_eq!(compute_hash(&p), fnv1a_hash_u32(&render(&p)));
    }

    #[test]
    fn test_golden_hashes() {
        assert_eq!(compute_hash(&params(4, 4, 10, (0.0, 0.0), 4.0)), 2_155_927_999);
        assert_eq!(compute_hash(&params(1, 1, 100, (0.0, 0.0), 4.0)), 4_218_009_092);
        assert_eq!(compute_hash(&params(8, 8, 100, (100.0, 100.0), 1.0)), 3_735_089_093);
        // 16 zero counts
        assert_eq!(compute_hash(&params(4, 4, 0, (0.0, 0.0), 4.0)), 3_755_895_493);
    }

    #[test]
    fn test_invalid_params_hash_zero() {
        assert_eq!(compute_hash(&params(0, 10, 100, (0.0, 0.0), 4.0)), 0);
        assert_eq!(compute_hash(&params(10, 0, 100, (0.0, 0.0), 4.0)), 0);
        assert_eq!(compute_hash(&params(10, 10, 100, (0.0, 0.0), -1.0)), 0);
        assert_eq!(compute_hash(&params(10, 10, 100, (f64::NAN, 0.0), 1.0)), 0);
        assert_ne!(compute_hash(&params(1, 1, 1, (0.0, 0.0), 1.0)), FNV_OFFSET_BASIS);
    }

    #[test]
    fn test_run_task_entry_point() {
        let p = params(4, 4, 10, (0.0, 0.0), 4.0);
        let bytes = codec::encode(&p.into());
        assert_eq!(mandelbrot_run_task(&bytes), 2_155_927_999);
        assert_eq!(mandelbrot_run_task(&bytes[..39]), 0);
        assert_eq!(mandelbrot_run_task(&[]), 0);
    }

    #[test]
    fn test_c_matches_rust_on_golden_params() {
        if !C_IMPL_AVAILABLE {
            return;
        }
        let bytes = codec::encode(&params(4, 4, 10, (0.0, 0.0), 4.0).into());
        assert_eq!(mandelbrot_c_run_task(&bytes), mandelbrot_run_task(&bytes));
        assert_eq!(mandelbrot_c_run_task(&bytes[..8]), 0);
    }

    // Full cross-language checks run through the registry's verify()
}
