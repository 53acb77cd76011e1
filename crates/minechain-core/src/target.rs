//! Compact target decoding and difficulty utilities.

use once_cell::sync::Lazy;

use crate::U256;

/// Compact encoding of the "difficulty 1" target from the reference
/// network's genesis block.
pub const MAX_TARGET_BITS: u32 = 0x1d00ffff;

/// Decoded value of [`MAX_TARGET_BITS`], computed once per process.
pub static MAX_TARGET: Lazy<f64> = Lazy::new(|| maximum_value(MAX_TARGET_BITS));

/// Decode a compact target to the real value it represents.
///
/// The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
/// Value = mantissa * 256^(exponent - 3)
///
/// Exponents below 3 scale the mantissa down fractionally instead of
/// truncating it. Every u32 input decodes to some value.
pub fn maximum_value(bits: u32) -> f64 {
    let mantissa = f64::from(bits & 0x00ff_ffff);
    let exponent = (bits >> 24) as i32;
    mantissa * 2f64.powi(8 * (exponent - 3))
}

/// Calculate difficulty from a compact target.
///
/// Difficulty = max_target / current_target, where max_target is the
/// "difficulty 1" value encoded by [`MAX_TARGET_BITS`].
pub fn difficulty(bits: u32) -> f64 {
    *MAX_TARGET / maximum_value(bits)
}

/// Decode a compact target to the exact 256-bit threshold.
///
/// Same layout as [`maximum_value`], but in integer arithmetic: exponents
/// below 3 shift the mantissa right, truncating any fractional part.
pub fn compact_to_target(bits: u32) -> U256 {
    let exponent = (bits >> 24) as usize;
    let mantissa = U256::from(bits & 0x00ff_ffff);

    if exponent <= 3 {
        mantissa >> (8 * (3 - exponent))
    } else {
        mantissa << (8 * (exponent - 3))
    }
}

/// Check if a raw double-SHA256 digest clears a target.
///
/// The digest is read as a 256-bit little-endian unsigned integer and
/// must be strictly below the target.
#[inline]
pub fn clears_target(digest: &[u8; 32], target: &U256) -> bool {
    U256::from_little_endian(digest) < *target
}
