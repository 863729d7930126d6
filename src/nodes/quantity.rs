//! Conversion between stored byte quantities and the GB figures operators edit.
//!
//! One GB is exactly 2^30 bytes. Storage truncates `gb * 2^30` toward zero, so an
//! integral GB figure round-trips exactly and a fractional one loses at most one byte.
//! Rounding for listings is a presentation concern and does not happen here.

pub const BYTES_PER_GB: i64 = 1 << 30;

pub fn to_display(bytes: i64) -> f64 {
    bytes as f64 / BYTES_PER_GB as f64
}

/// Negative, non-finite or missing input stores as zero. Values beyond `i64::MAX`
/// saturate.
pub fn to_storage(gb: f64) -> i64 {
    if !gb.is_finite() || gb <= 0.0 {
        return 0;
    }
    (gb * BYTES_PER_GB as f64).trunc() as i64
}
