//! Rounding used for every float-to-integer conversion in the pipeline.

/// Round to the nearest integer, ties to even (`0.5 -> 0`, `1.5 -> 2`, `2.5 -> 2`).
#[inline]
pub fn round_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}

/// Round to the nearest `u8`, ties to even, saturating at the type bounds.
#[inline]
pub fn round_even_u8(value: f32) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
