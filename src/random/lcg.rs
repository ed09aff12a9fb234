//! Linear congruential generator used inside the tasks.
//!
//! `seed = seed * 1664525 + 1013904223 (mod 2^32)`. The increment keeps a
//! zero seed from collapsing into a zero sequence.

pub const LCG_MULTIPLIER: u32 = 1_664_525;
pub const LCG_INCREMENT: u32 = 1_013_904_223;

/// Advance `seed` in place and return the new value
#[inline]
pub fn lcg_next(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
    *seed
}

/// Map a raw LCG draw into `[min, max]`.
///
/// Normalization and interpolation happen in `f64`; only the final value is
/// narrowed to `f32`.
#[inline]
pub fn lcg_to_float_range(value: u32, min: f32, max: f32) -> f32 {
    let normalized = value as f64 / u32::MAX as f64;
    let min = min as f64;
    let max = max as f64;
    (min + normalized * (max - min)) as f32
}

/// Owned LCG stream
#[derive(Debug)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        lcg_next(&mut self.seed)
    }

    #[inline]
    pub fn next_f32(&mut self, min: f32, max: f32) -> f32 {
        lcg_to_float_range(self.next_u32(), min, max)
    }

    /// Seed to continue the stream from (A and B matrices share one stream)
    pub fn seed(&self) -> u32 {
        self.seed
    }
}
