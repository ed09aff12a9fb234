//! Reference Mandelbrot renderer.

use crate::codec;
use crate::hash::Fnv1a;
use crate::params::MandelbrotParams;

/// Squared magnitude past which an orbit is considered divergent
pub const DIVERGENCE_THRESHOLD: f64 = 4.0;

/// ABI entry point: decode the parameter buffer, render, hash
pub fn mandelbrot_run_task(params: &[u8]) -> u32 {
    match codec::decode_mandelbrot(params) {
        Ok(params) => compute_hash(&params),
        Err(_) => 0,
    }
}

/// FNV-1a over the iteration counts in row-major order, `0` for invalid params
pub fn compute_hash(params: &MandelbrotParams) -> u32 {
    if params.validate().is_err() {
        return 0;
    }
    let mut hasher = Fnv1a::new();
    for_each_pixel(params, |count| hasher.write_u32(count));
    hasher.finish()
}

/// Iteration counts for every pixel, row by row
pub fn render(params: &MandelbrotParams) -> Vec<u32> {
    let mut counts = Vec::with_capacity(params.width as usize * params.height as usize);
    for_each_pixel(params, |count| counts.push(count));
    counts
}

fn for_each_pixel(params: &MandelbrotParams, mut sink: impl FnMut(u32)) {
    let width = params.width as f64;
    let height = params.height as f64;

    for y in 0..params.height {
        let y_norm = (y as f64) / height - 0.5;
        let c_imag = params.center_imag + y_norm * params.scale_factor;
        for x in 0..params.width {
            let x_norm = (x as f64) / width - 0.5;
            let c_real = params.center_real + x_norm * params.scale_factor;
            sink(escape_iterations(c_real, c_imag, params.max_iter));
        }
    }
}

/// Number of `z <- z^2 + c` steps taken before the orbit escapes, capped at `max_iter`
#[inline]
pub fn escape_iterations(c_real: f64, c_imag: f64, max_iter: u32) -> u32 {
    let mut z_real = 0.0f64;
    let mut z_imag = 0.0f64;
    let mut iterations = 0;

    while iterations < max_iter {
        if z_real * z_real + z_imag * z_imag > DIVERGENCE_THRESHOLD {
            break;
        }
        let next_real = z_real * z_real - z_imag * z_imag + c_real;
        let next_imag = 2.0 * z_real * z_imag + c_imag;
        z_real = next_real;
        z_imag = next_imag;
        iterations += 1;
    }

    iterations
}
