//! Conversion of continuous pose changes into integer motion counts
//!
//! HID pointers only move in whole counts. Each cycle the scaled pose
//! change is added to a per-axis remainder, the remainder is truncated
//! toward zero to get the counts to report, and the reported counts are
//! subtracted back out. The fractional part carries over, so many slow
//! sub-count movements still add up to motion.

use nalgebra::Vector3;

/// Integer motion counts for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Motion {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Drop horizontal motion unless the stylus is touching
    ///
    /// Vertical motion is always kept.
    pub fn gated(self, touching: bool) -> Self {
        if touching {
            self
        } else {
            Self { x: 0, y: 0, ..self }
        }
    }
}

/// Whether a stylus at `height` counts as pressed against the desk
///
/// With no threshold configured the stylus is always touching.
#[inline]
pub fn is_touching(height: f32, contact_height: Option<f32>) -> bool {
    contact_height.is_none_or(|threshold| height < threshold)
}

/// Add `delta` to `remainder` and take out the whole counts
///
/// Returns the counts truncated toward zero; `remainder` keeps the
/// fractional part.
///
/// # Example
/// ```
/// use arm_pointer::accumulator::carry;
///
/// let mut remainder = 0.0;
/// assert_eq!(carry(&mut remainder, 0.75), 0);
/// assert_eq!(carry(&mut remainder, 0.75), 1);
/// assert_eq!(remainder, 0.5);
/// assert_eq!(carry(&mut remainder, -2.25), -1);
/// assert_eq!(remainder, -0.75);
/// ```
#[inline]
pub fn carry(remainder: &mut f32, delta: f32) -> i32 {
    *remainder += delta;
    // `as` truncates toward zero and saturates at the i32 range
    let counts = *remainder as i32;
    *remainder -= counts as f32;
    counts
}

/// Differential motion accumulator with remainder carry
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use arm_pointer::{Motion, MotionAccumulator};
///
/// let mut accumulator = MotionAccumulator::new();
/// // The first pose only sets the reference
/// assert_eq!(accumulator.integrate(Vector3::new(10.0, 0.0, 0.0), 10.0), Motion::ZERO);
/// assert_eq!(
///     accumulator.integrate(Vector3::new(10.25, 0.0, 0.0), 10.0),
///     Motion::new(2, 0, 0),
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MotionAccumulator {
    previous: Option<Vector3<f32>>,
    remainder: Vector3<f32>,
}

impl MotionAccumulator {
    pub fn new() -> Self {
        Self {
            previous: None,
            remainder: Vector3::zeros(),
        }
    }

    /// Integrate the change from the previous pose to `pose`
    ///
    /// `sensitivity` is counts per pose unit. `pose` always becomes the new
    /// reference. Without a reference yet, nothing moves.
    pub fn integrate(&mut self, pose: Vector3<f32>, sensitivity: f32) -> Motion {
        let Some(previous) = self.previous.replace(pose) else {
            return Motion::ZERO;
        };
        let delta = (pose - previous) * sensitivity;
        Motion::new(
            carry(&mut self.remainder.x, delta.x),
            carry(&mut self.remainder.y, delta.y),
            carry(&mut self.remainder.z, delta.z),
        )
    }

    /// Forget the reference pose and any carried fractions
    pub fn reset(&mut self) {
        self.previous = None;
        self.remainder = Vector3::zeros();
    }

    /// Fractional counts not yet reported
    pub fn remainder(&self) -> Vector3<f32> {
        self.remainder
    }

    /// Reference pose for the next cycle
    pub fn previous(&self) -> Option<Vector3<f32>> {
        self.previous
    }

    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }
}

impl Default for MotionAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_pose_primes_without_motion() {
        let mut accumulator = MotionAccumulator::new();
        assert!(!accumulator.is_primed());
        let motion = accumulator.integrate(Vector3::new(100.0, -50.0, 375.0), 10.0);
        assert_eq!(motion, Motion::ZERO);
        assert!(accumulator.is_primed());
        assert_eq!(accumulator.previous(), Some(Vector3::new(100.0, -50.0, 375.0)));
    }

    #[test]
    fn test_truncates_toward_zero() {
        let mut accumulator = MotionAccumulator::new();
        accumulator.integrate(Vector3::zeros(), 1.0);
        let motion = accumulator.integrate(Vector3::new(1.5, -1.5, 0.5), 1.0);
        assert_eq!(motion, Motion::new(1, -1, 0));
        let remainder = accumulator.remainder();
        assert_eq!(remainder, Vector3::new(0.5, -0.5, 0.5));
    }

    #[test]
    fn test_sub_count_steps_add_up() {
        let mut accumulator = MotionAccumulator::new();
        accumulator.integrate(Vector3::zeros(), 1.0);
        let mut total = 0;
        for i in 1..=8 {
            let motion = accumulator.integrate(Vector3::new(0.25 * i as f32, 0.0, 0.0), 1.0);
            total += motion.x;
        }
        assert_eq!(total, 2);
        assert_eq!(accumulator.remainder().x, 0.0);
    }

    #[test]
    fn test_remainder_stays_below_one_count() {
        let mut accumulator = MotionAccumulator::new();
        let mut pose = Vector3::zeros();
        accumulator.integrate(pose, 3.7);
        for i in 0..500 {
            let step = ((i * 37) % 11) as f32 * 0.13 - 0.6;
            pose += Vector3::new(step, -step * 0.5, step * 2.0);
            accumulator.integrate(pose, 3.7);
            let remainder = accumulator.remainder();
            assert!(remainder.x.abs() < 1.0);
            assert!(remainder.y.abs() < 1.0);
            assert!(remainder.z.abs() < 1.0);
        }
    }

    #[test]
    fn test_reset_forgets_reference() {
        let mut accumulator = MotionAccumulator::new();
        accumulator.integrate(Vector3::zeros(), 1.0);
        accumulator.integrate(Vector3::new(0.5, 0.0, 0.0), 1.0);
        accumulator.reset();
        assert!(!accumulator.is_primed());
        assert_eq!(accumulator.remainder(), Vector3::zeros());
        assert_eq!(
            accumulator.integrate(Vector3::new(500.0, 0.0, 0.0), 1.0),
            Motion::ZERO
        );
    }

    #[test]
    fn test_gate_keeps_vertical_motion() {
        let motion = Motion::new(3, -4, 5);
        assert_eq!(motion.gated(true), motion);
        assert_eq!(motion.gated(false), Motion::new(0, 0, 5));
    }

    #[test]
    fn test_contact_threshold() {
        assert!(is_touching(1000.0, None));
        assert!(is_touching(1.9, Some(2.0)));
        assert!(!is_touching(2.0, Some(2.0)));
        assert!(!is_touching(50.0, Some(2.0)));
    }
}
