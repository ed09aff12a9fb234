//! Xorshift32 generator.
//!
//! The recurrence is `x ^= x << 13; x ^= x >> 17; x ^= x << 5` over `u32`
//! with natural wraparound, and each draw is normalized by `2^32`.
//! State `0` is a fixed point: a zero seed yields an all-zero stream.

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Seeded xorshift32 stream.
///
/// Deliberately not `Clone`: one generator is one sequence. Use
/// [`Xorshift32::fork`] to derive an independent stream explicitly.
#[derive(Debug)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the register and return the raw 32-bit state
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next value in [0, 1)
    #[inline]
    pub fn next(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Integer in the inclusive range [min, max]
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(min <= max);
        let span = (max as i128 - min as i128 + 1) as f64;
        let offset = (self.next() * span).floor() as i128;
        (min as i128 + offset).min(max as i128) as i64
    }

    /// Float in [min, max)
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Derive an independent generator seeded from this stream's next draw
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u32())
    }

    /// Current register value (for diagnostics and fixtures)
    pub fn state(&self) -> u32 {
        self.state
    }
}
