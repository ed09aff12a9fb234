//! FNV-1a (32-bit) verification hash.
//!
//! The hash is an equality oracle between independently compiled
//! implementations, not a security primitive. Traversal order is part of the
//! contract: matrices are hashed row-major, records in generation order.

pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
pub const FNV_PRIME: u32 = 16_777_619;

/// Decimal digits kept when normalizing floats before hashing
pub const PRECISION_DIGITS: u32 = 6;

/// Streaming FNV-1a state
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a {
    hash: u32,
}

impl Fnv1a {
    pub const fn new() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }

    #[inline(always)]
    pub fn write_u8(&mut self, byte: u8) {
        self.hash ^= byte as u32;
        self.hash = self.hash.wrapping_mul(FNV_PRIME);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_u8(byte);
        }
    }

    /// Hash a `u32` as 4 little-endian bytes
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Hash an `i32` as 4 little-endian bytes
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Hash a float after rounding it to [`PRECISION_DIGITS`] decimals
    #[inline]
    pub fn write_f32_rounded(&mut self, value: f32) {
        self.write_i32(round_f32_to_precision(value, PRECISION_DIGITS));
    }

    pub fn finish(&self) -> u32 {
        self.hash
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a over a sequence of `u32` values
pub fn fnv1a_hash_u32(data: &[u32]) -> u32 {
    let mut hasher = Fnv1a::new();
    for &value in data {
        hasher.write_u32(value);
    }
    hasher.finish()
}

/// FNV-1a over floats, each rounded to 6 decimals and scaled by 10^6 first
pub fn fnv1a_hash_f32_rounded<I>(values: I) -> u32
where
    I: IntoIterator<Item = f32>,
{
    let mut hasher = Fnv1a::new();
    for value in values {
        hasher.write_f32_rounded(value);
    }
    hasher.finish()
}

/// Round `value` to `digits` decimals and return it scaled to an integer.
///
/// The multiplication is carried out in `f64` and rounds half away from zero.
#[inline]
pub fn round_f32_to_precision(value: f32, digits: u32) -> i32 {
    let multiplier = 10f64.powi(digits as i32);
    ((value as f64) * multiplier).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_offset_basis() {
        assert_eq!(fnv1a_hash_u32(&[]), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a_hash_f32_rounded(std::iter::empty()), FNV_OFFSET_BASIS);
        assert_eq!(Fnv1a::new().finish(), 2_166_136_261);
    }

    #[test]
    fn test_known_byte_hash() {
        // Standard FNV-1a 32 test vector: "a" -> 0xe40c292c
        let mut hasher = Fnv1a::new();
        hasher.write_bytes(b"a");
        assert_eq!(hasher.finish(), 0xe40c_292c);

        let mut hasher = Fnv1a::new();
        hasher.write_bytes(b"foobar");
        assert_eq!(hasher.finish(), 0xbf9c_f968);
    }

    #[test]
    fn test_u32_is_little_endian() {
        let mut bytes = Fnv1a::new();
        bytes.write_bytes(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(fnv1a_hash_u32(&[0x1234_5678]), bytes.finish());
    }

    #[test]
    fn test_hash_consistency() {
        assert_eq!(fnv1a_hash_u32(&[1, 2, 3, 4, 5]), fnv1a_hash_u32(&[1, 2, 3, 4, 5]));
        assert_ne!(fnv1a_hash_u32(&[1, 2, 3, 4, 5]), fnv1a_hash_u32(&[1, 2, 3, 4, 6]));
        assert_ne!(fnv1a_hash_u32(&[0]), FNV_OFFSET_BASIS);
    }

    #[test]
    fn test_round_f32_to_precision() {
        assert_eq!(round_f32_to_precision(1.234567, 6), 1_234_567);
        assert_eq!(round_f32_to_precision(-1.234567, 6), -1_234_567);
        assert_eq!(round_f32_to_precision(0.0, 6), 0);
        assert_eq!(round_f32_to_precision(1.234_567_9, 4), 12346);
        assert_eq!(round_f32_to_precision(1.234_543_2, 4), 12345);
    }

    #[test]
    fn test_float_hash_is_order_sensitive() {
        let row_major = [1.0f32, 2.0, 3.0, 4.0];
        let transposed = [1.0f32, 3.0, 2.0, 4.0];
        assert_ne!(
            fnv1a_hash_f32_rounded(row_major),
            fnv1a_hash_f32_rounded(transposed)
        );
    }

    #[test]
    fn test_float_hash_normalizes_tiny_differences() {
        // Both values round to 1000000 at 6 decimals
        assert_eq!(
            fnv1a_hash_f32_rounded([1.0f32]),
            fnv1a_hash_f32_rounded([1.000_000_1f32])
        );
    }
}
