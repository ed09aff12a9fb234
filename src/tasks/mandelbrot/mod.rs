//! # Mandelbrot Set
//!
//! Renders a `width x height` grid centered on `center` and spanning
//! `scale_factor` in both axes. For each pixel the escape iteration count of
//! `z <- z^2 + c` is recorded; the verification hash is FNV-1a over the counts
//! in row-major order.
//!
//! Counts are integers, so any two implementations doing the same `f64`
//! operations in the same order agree bit for bit.

pub mod code;
pub mod test;

pub use code::*;

use crate::params::{MandelbrotParams, TaskKind};
use crate::registry::{RunTaskFn, TaskRunner};
use crate::utils::VariantInfo;
use crate::verify::VerificationVector;

/// Runner for the Mandelbrot task
pub struct MandelbrotRunner;

impl TaskRunner for MandelbrotRunner {
    fn kind(&self) -> TaskKind {
        TaskKind::Mandelbrot
    }

    fn description(&self) -> &'static str {
        "Escape-time iteration counts over a complex-plane grid"
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

fn params(width: u32, height: u32, max_iter: u32, center: (f64, f64), scale_factor: f64) -> MandelbrotParams {
    MandelbrotParams {
        width,
        height,
        max_iter,
        center_real: center.0,
        center_imag: center.1,
        scale_factor,
    }
}

/// (name, description, category, params) for every reference vector
pub fn reference_cases() -> Vec<(String, String, &'static str, MandelbrotParams)> {
    let mut cases = Vec::new();

    let sizes = [(2, 2), (4, 4), (10, 10), (32, 32)];
    let iterations = [10, 100];
    let centers = [(0.0, 0.0), (-0.5, 0.0), (-0.75, 0.1), (0.25, 0.5)];
    let scales = [4.0, 1.0, 0.01];

    for (i, &(width, height)) in sizes.iter().enumerate() {
        for (j, &max_iter) in iterations.iter().enumerate() {
            for (k, &center) in centers.iter().enumerate() {
                for (l, &scale) in scales.iter().enumerate() {
                    cases.push((
                        format!("systematic_{i}_{j}_{k}_{l}"),
                        format!(
                            "{}x{}, iter={}, center=({:.3},{:.3}), scale={:.3}",
                            width, height, max_iter, center.0, center.1, scale
                        ),
                        "systematic",
                        params(width, height, max_iter, center, scale),
                    ));
                }
            }
        }
    }

    let critical = [
        ("origin_high_precision", "Origin with a high iteration cap", params(64, 64, 2000, (0.0, 0.0), 4.0)),
        ("main_cardioid_boundary", "Main cardioid boundary", params(64, 64, 1000, (-0.75, 0.0), 0.1)),
        ("period_2_bulb", "Period-2 bulb region", params(48, 48, 1000, (-1.25, 0.0), 0.3)),
        ("seahorse_valley", "Seahorse valley at high zoom", params(64, 64, 2000, (-0.75, 0.1), 0.005)),
        ("edge_of_set", "Set boundary under extreme zoom", params(50, 50, 1000, (-0.7269, 0.1889), 0.0001)),
        ("large_scale_overview", "Entire visible set", params(100, 100, 500, (-0.5, 0.0), 3.0)),
        ("minimal_image", "Single pixel", params(1, 1, 100, (0.0, 0.0), 4.0)),
        ("extreme_iterations", "Very high iteration cap on a tiny grid", params(8, 8, 100_000, (0.0, 0.0), 4.0)),
    ];
    for (name, description, p) in critical {
        cases.push((name.to_string(), description.to_string(), "critical", p));
    }

    let precision = [
        ("deep_zoom_1e-10", params(16, 16, 1000, (-0.743_643_887_037_151, 0.131_825_904_205_33), 1e-10)),
        ("deep_zoom_1e-13", params(16, 16, 2000, (-0.743_643_887_037_151, 0.131_825_904_205_33), 1e-13)),
        ("tiny_offset_from_origin", params(8, 8, 500, (1e-15, -1e-15), 1e-12)),
        ("escape_radius_edge", params(16, 16, 50, (2.0, 0.0), 0.001)),
    ];
    for (name, p) in precision {
        cases.push((name.to_string(), "Floating-point precision check".to_string(), "precision", p));
    }

    let edge = [
        ("single_row", "1 pixel high strip", params(100, 1, 100, (-0.5, 0.0), 3.0)),
        ("single_column", "1 pixel wide strip", params(1, 100, 100, (-0.5, 0.0), 3.0)),
        ("zero_iterations", "No iterations: every count is 0", params(4, 4, 0, (0.0, 0.0), 4.0)),
        ("one_iteration", "A single iteration per pixel", params(4, 4, 1, (0.0, 0.0), 4.0)),
        ("far_outside", "Every pixel escapes after one step", params(8, 8, 100, (100.0, 100.0), 1.0)),
        ("invalid_zero_width", "Rejected: zero width", params(0, 10, 100, (0.0, 0.0), 4.0)),
        ("invalid_zero_scale", "Rejected: zero scale", params(10, 10, 100, (0.0, 0.0), 0.0)),
        ("invalid_oversized", "Rejected: width over the limit", params(10_001, 1, 10, (0.0, 0.0), 4.0)),
    ];
    for (name, description, p) in edge {
        cases.push((name.to_string(), description.to_string(), "edge_case", p));
    }

    cases
}
