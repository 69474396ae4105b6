//! Forward kinematics of the two-link arm on a turntable
//!
//! The arm moves in a vertical plane: arm 1 pivots at the shoulder, arm 2
//! at the elbow, both measured from straight up. That plane is rotated
//! about the vertical turntable axis, whose centre is `base_offset` away
//! from the shoulder pivot's projection.
//!
//! ```text
//!            tip
//!           /
//!      arm2/
//!         /  elbow
//!         |
//!     arm1|
//!         |
//!  -------o shoulder ---- base_offset ---- turntable axis
//! ```

use nalgebra::{ComplexField, Vector3};

use crate::acquisition::JointAngles;
use crate::types::{ArmGeometry, OutputFrame};

/// Compute the stylus tip position in millimetres
///
/// Closed form, no iteration. Angles are in radians: `angle1` shoulder,
/// `angle2` elbow (relative to arm 1), `angle3` turntable. With every
/// angle at zero the arm points straight up.
///
/// # Example
/// ```
/// use arm_pointer::kinematics::position;
///
/// let tip = position(0.0, 0.0, 0.0, 170.0, 205.0, 10.0);
/// assert_eq!((tip.x, tip.y, tip.z), (0.0, 10.0, 375.0));
/// ```
pub fn position(
    angle1: f32,
    angle2: f32,
    angle3: f32,
    arm1_length: f32,
    arm2_length: f32,
    base_offset: f32,
) -> Vector3<f32> {
    let (sin1, cos1) = angle1.sin_cos();
    let (sin12, cos12) = (angle1 + angle2).sin_cos();
    let (sin3, cos3) = angle3.sin_cos();

    // Planar arm: x forward, z up, y is the fixed lateral offset
    let x1 = sin1 * arm1_length;
    let y1 = base_offset;
    let z1 = cos1 * arm1_length;
    let x2 = x1 + sin12 * arm2_length;
    let z2 = z1 + cos12 * arm2_length;

    // Turntable rotation about z
    let x3 = x2 * cos3 - y1 * sin3;
    let y3 = x2 * sin3 + y1 * cos3;

    Vector3::new(x3, y3, z2)
}

impl ArmGeometry {
    /// Tip position in the arm frame for the given joint angles
    pub fn position(&self, angles: &JointAngles) -> Vector3<f32> {
        position(
            angles.arm1,
            angles.arm2,
            angles.turntable,
            self.arm1_length,
            self.arm2_length,
            self.base_offset,
        )
    }
}

impl OutputFrame {
    /// Map an arm-frame pose into this frame
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use arm_pointer::OutputFrame;
    ///
    /// let pose = Vector3::new(1.0, 2.0, 3.0);
    /// assert_eq!(OutputFrame::Arm.apply(pose), pose);
    /// assert_eq!(OutputFrame::Upright.apply(pose), Vector3::new(1.0, -3.0, 2.0));
    /// ```
    #[inline]
    pub fn apply(self, pose: Vector3<f32>) -> Vector3<f32> {
        match self {
            OutputFrame::Arm => pose,
            OutputFrame::Upright => Vector3::new(pose.x, -pose.z, pose.y),
        }
    }
}
