//! Angle conversion helpers

use core::f32::consts::TAU;

/// Counts per full turn of a 12-bit absolute encoder
pub const COUNTS_PER_TURN: u16 = 4096;

/// Largest valid raw encoder reading
pub const MAX_RAW_ANGLE: u16 = COUNTS_PER_TURN - 1;

/// Radians per encoder count
pub const RAD_PER_COUNT: f32 = TAU / COUNTS_PER_TURN as f32;

/// Converts a raw 12-bit encoder reading to radians in `[0, 2π)`
///
/// Bits above the 12-bit range are discarded.
///
/// # Example
/// ```
/// use arm_pointer::math::raw_to_radians;
///
/// assert_eq!(raw_to_radians(0), 0.0);
/// assert!((raw_to_radians(1024) - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// ```
#[inline]
pub fn raw_to_radians(raw: u16) -> f32 {
    (raw & MAX_RAW_ANGLE) as f32 * RAD_PER_COUNT
}

/// Reduces an angle into `[0, 2π)`
///
/// Negative inputs wrap from the top. The result is strictly below `2π`
/// even when `angle + 2π` rounds to exactly `2π`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped < 0.0 {
        wrapped += TAU;
    }
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest angular distance between two angles, in `[0, π]`
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let difference = wrap_angle(a - b);
    difference.min(TAU - difference)
}
