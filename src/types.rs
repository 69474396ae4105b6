//! Core types and configuration for the arm pointer pipeline

/// One of the three sensed rotational joints
///
/// The discriminant is the joint's index in every per-axis array of the
/// crate (angles, offsets, smoothing windows and the stored calibration
/// record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Shoulder joint (arm 1)
    Arm1 = 0,
    /// Elbow joint (arm 2)
    Arm2 = 1,
    /// Vertical turntable joint
    Turntable = 2,
}

impl Axis {
    /// All axes in record order
    pub const ALL: [Axis; 3] = [Axis::Arm1, Axis::Arm2, Axis::Turntable];

    /// Index of the axis in per-axis arrays
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed arm geometry in millimetres
///
/// # Example
/// ```
/// use arm_pointer::ArmGeometry;
///
/// let geometry = ArmGeometry {
///     base_offset: 12.5,
///     ..Default::default()
/// };
/// assert_eq!(geometry.arm1_length, 170.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmGeometry {
    /// Length of the first link, shoulder pivot to elbow pivot
    pub arm1_length: f32,
    /// Length of the second link, elbow pivot to stylus tip
    pub arm2_length: f32,
    /// Lateral offset from the turntable axis to the shoulder pivot
    pub base_offset: f32,
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self {
            arm1_length: 170.0,
            arm2_length: 205.0,
            base_offset: 0.0,
        }
    }
}

/// Axis convention of the pose handed to the motion accumulator
///
/// Forward kinematics always computes in the arm frame: X and Y span the
/// desk plane, Z is height above the shoulder. The output frame is applied
/// once, after kinematics, and every motion axis downstream is expressed
/// in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputFrame {
    /// `(x, y, z)`: pointer Y follows the desk plane
    Arm,
    /// `(x, -z, y)`: pointer Y follows stylus height, screen-style
    #[default]
    Upright,
}

/// HID report encoding, selected once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Standard relative pointer: `dx`, `dy`, buttons
    #[default]
    Pointer,
    /// Vendor report: clamped `dx`, `dy`, `dz`, buttons and the raw pose
    Vendor,
}

/// One of the three physical push buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    First = 0,
    Second = 1,
    Third = 2,
}

impl Button {
    /// Bit of this button in a [`ButtonState`](crate::ButtonState) mask
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Tracker configuration
///
/// The defaults describe the reference device.
///
/// # Example
/// ```
/// use arm_pointer::{OutputFrame, Profile, TrackerSettings};
///
/// let settings = TrackerSettings {
///     sensitivity: 4.0,
///     contact_height: Some(20.0),
///     frame: OutputFrame::Arm,
///     profile: Profile::Vendor,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    /// Arm link lengths and base offset
    pub geometry: ArmGeometry,
    /// Axis convention applied to the pose before accumulation
    pub frame: OutputFrame,
    /// HID report encoding
    pub profile: Profile,
    /// Motion counts per millimetre of stylus travel
    pub sensitivity: f32,
    /// Number of samples averaged per axis
    ///
    /// Clamped to `1..=MAX_SMOOTHING_WINDOW`.
    pub smoothing_window: usize,
    /// Arm-frame height below which the stylus counts as touching the desk
    ///
    /// Horizontal motion is only reported while touching. `None` disables
    /// the gate and motion is always reported.
    pub contact_height: Option<f32>,
    /// Button whose press re-zeroes the pose instead of being reported
    pub calibration_button: Option<Button>,
    /// Consecutive failed sensor reads before motion output stops
    pub fault_limit: u32,
    /// Optional pause between loop iterations in microseconds
    pub loop_period_us: Option<u32>,
    /// Byte address of the calibration record in non-volatile storage
    pub storage_address: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            geometry: ArmGeometry::default(),
            frame: OutputFrame::default(),
            profile: Profile::default(),
            sensitivity: 10.0,
            smoothing_window: 3,
            contact_height: None,
            calibration_button: Some(Button::Third),
            fault_limit: 8,
            loop_period_us: None,
            storage_address: 0,
        }
    }
}
