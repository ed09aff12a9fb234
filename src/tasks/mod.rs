//! Benchmark tasks.
//!
//! Each task directory holds its language implementations under `code/`,
//! a runner registering them, and tests under `test/`.

pub mod json_parse;
pub mod mandelbrot;
pub mod matrix_mul;
