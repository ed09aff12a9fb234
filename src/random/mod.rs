//! Deterministic pseudo-random generators.
//!
//! Two generators live here and both are part of the cross-implementation
//! contract: every conforming implementation must reproduce their output
//! bit for bit.
//!
//! - [`Xorshift32`] drives the scaled test-data generator.
//! - [`Lcg`] feeds matrix elements and JSON record values inside the tasks.

pub mod lcg;
pub mod xorshift;

pub use lcg::{lcg_next, lcg_to_float_range, Lcg, LCG_INCREMENT, LCG_MULTIPLIER};
pub use xorshift::Xorshift32;
