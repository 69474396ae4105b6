//! Angle acquisition: raw encoder reads to smoothed, calibrated joint angles

use crate::calibration::CalibrationOffsets;
use crate::error::Error;
use crate::math::{raw_to_radians, wrap_angle};
use crate::smoothing::SmoothingWindow;
use crate::types::Axis;

/// A 12-bit absolute rotary encoder
///
/// `read_raw` returns one full mechanical turn as `0..=4095`.
pub trait AngleSensor {
    type Error: core::fmt::Debug;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

impl<T: AngleSensor + ?Sized> AngleSensor for &mut T {
    type Error = T::Error;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        (**self).read_raw()
    }
}

/// Source of one raw reading per joint, in [`Axis`] order
pub trait AngleSource {
    fn read_raw(&mut self) -> Result<[u16; 3], Error>;
}

/// The three joint encoders
///
/// Each encoder may sit on a different bus, so each has its own type.
pub struct JointSensors<A, B, C> {
    pub arm1: A,
    pub arm2: B,
    pub turntable: C,
}

impl<A, B, C> JointSensors<A, B, C>
where
    A: AngleSensor,
    B: AngleSensor,
    C: AngleSensor,
{
    pub fn new(arm1: A, arm2: B, turntable: C) -> Self {
        Self {
            arm1,
            arm2,
            turntable,
        }
    }
}

impl<A, B, C> AngleSource for JointSensors<A, B, C>
where
    A: AngleSensor,
    B: AngleSensor,
    C: AngleSensor,
{
    /// Read all three encoders, stopping at the first failure
    fn read_raw(&mut self) -> Result<[u16; 3], Error> {
        let arm1 = self.arm1.read_raw().map_err(|_e| {
            warn!("arm 1 encoder read failed");
            Error::Sensor(Axis::Arm1)
        })?;
        let arm2 = self.arm2.read_raw().map_err(|_e| {
            warn!("arm 2 encoder read failed");
            Error::Sensor(Axis::Arm2)
        })?;
        let turntable = self.turntable.read_raw().map_err(|_e| {
            warn!("turntable encoder read failed");
            Error::Sensor(Axis::Turntable)
        })?;
        Ok([arm1, arm2, turntable])
    }
}

/// Joint angles in radians, one per axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointAngles {
    /// Shoulder
    pub arm1: f32,
    /// Elbow
    pub arm2: f32,
    /// Turntable
    pub turntable: f32,
}

impl JointAngles {
    pub const fn new(arm1: f32, arm2: f32, turntable: f32) -> Self {
        Self {
            arm1,
            arm2,
            turntable,
        }
    }

    /// Angle of a single axis
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Arm1 => self.arm1,
            Axis::Arm2 => self.arm2,
            Axis::Turntable => self.turntable,
        }
    }
}

impl From<[f32; 3]> for JointAngles {
    fn from(angles: [f32; 3]) -> Self {
        Self::new(angles[0], angles[1], angles[2])
    }
}

/// Calibrated, smoothed joint angle estimation
///
/// Each reading is converted to radians, shifted by its axis offset,
/// wrapped into `[0, 2π)` and then averaged with the previous readings of
/// that axis. The unshifted readings are averaged alongside, so a new zero
/// can be taken without trusting the current offsets.
///
/// # Example
/// ```
/// use arm_pointer::{AngleAcquisition, CalibrationOffsets};
///
/// let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
/// let angles = acquisition.sample_raw([0, 1024, 2048]);
/// assert!((angles.arm2 - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct AngleAcquisition {
    windows: [SmoothingWindow; 3],
    raw_windows: [SmoothingWindow; 3],
    offsets: CalibrationOffsets,
}

impl AngleAcquisition {
    pub fn new(window_size: usize, offsets: CalibrationOffsets) -> Self {
        let window = SmoothingWindow::new(window_size);
        Self {
            windows: [window.clone(), window.clone(), window.clone()],
            raw_windows: [window.clone(), window.clone(), window],
            offsets,
        }
    }

    /// Feed one set of raw encoder readings
    pub fn sample_raw(&mut self, raw: [u16; 3]) -> JointAngles {
        self.sample_radians(raw.map(raw_to_radians))
    }

    /// Feed one set of uncalibrated readings already in radians
    pub fn sample_radians(&mut self, radians: [f32; 3]) -> JointAngles {
        let mut smoothed = [0.0; 3];
        for axis in Axis::ALL {
            let i = axis.index();
            self.raw_windows[i].add(wrap_angle(radians[i]));
            let calibrated = wrap_angle(radians[i] - self.offsets.get(axis));
            smoothed[i] = self.windows[i].add(calibrated);
        }
        trace!("angles {} {} {}", smoothed[0], smoothed[1], smoothed[2]);
        JointAngles::from(smoothed)
    }

    /// Read the encoders and feed the result
    ///
    /// On a failed read nothing is fed and the windows are unchanged.
    pub fn read<J: AngleSource>(&mut self, sensors: &mut J) -> Result<JointAngles, Error> {
        let raw = sensors.read_raw()?;
        Ok(self.sample_raw(raw))
    }

    /// Current smoothed angles without feeding a new sample
    pub fn current(&self) -> JointAngles {
        JointAngles::new(
            self.windows[0].mean(),
            self.windows[1].mean(),
            self.windows[2].mean(),
        )
    }

    /// Smoothed angles with no offsets applied
    pub fn current_raw(&self) -> JointAngles {
        JointAngles::new(
            self.raw_windows[0].mean(),
            self.raw_windows[1].mean(),
            self.raw_windows[2].mean(),
        )
    }

    pub fn offsets(&self) -> CalibrationOffsets {
        self.offsets
    }

    /// Replace the offsets and restart smoothing
    ///
    /// The calibrated windows hold angles relative to the old zero, so they
    /// are cleared. The raw windows are kept.
    pub fn set_offsets(&mut self, offsets: CalibrationOffsets) {
        self.offsets = offsets;
        for window in &mut self.windows {
            window.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular_distance;
    use core::f32::consts::TAU;

    struct Fixed(u16);

    impl AngleSensor for Fixed {
        type Error = ();

        fn read_raw(&mut self) -> Result<u16, ()> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl AngleSensor for Broken {
        type Error = ();

        fn read_raw(&mut self) -> Result<u16, ()> {
            Err(())
        }
    }

    #[test]
    fn test_offset_is_subtracted_and_wrapped() {
        let offsets = CalibrationOffsets::new(1.0, 0.0, 0.0);
        let mut acquisition = AngleAcquisition::new(1, offsets);
        let angles = acquisition.sample_radians([0.5, 0.0, 0.0]);
        assert!((angles.arm1 - (TAU - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_output_stays_in_range() {
        let offsets = CalibrationOffsets::new(3.0, 5.5, 0.1);
        let mut acquisition = AngleAcquisition::new(3, offsets);
        for raw in (0..4096).step_by(7) {
            let angles = acquisition.sample_raw([raw, 4095 - raw, raw / 2]);
            for axis in Axis::ALL {
                let angle = angles.get(axis);
                assert!((0.0..TAU).contains(&angle), "{axis:?} = {angle}");
            }
        }
    }

    #[test]
    fn test_calibrated_pose_reads_zero() {
        let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
        for _ in 0..3 {
            acquisition.sample_radians([1.0, 2.0, 0.5]);
        }
        let offsets = crate::calibration::calibrate(acquisition.current_raw());
        acquisition.set_offsets(offsets);
        let angles = acquisition.sample_radians([1.0, 2.0, 0.5]);
        for axis in Axis::ALL {
            assert!(angular_distance(angles.get(axis), 0.0) < 1e-5);
        }
    }

    #[test]
    fn test_read_from_sensors() {
        let mut sensors = JointSensors::new(Fixed(0), Fixed(2048), Fixed(1024));
        let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
        let angles = acquisition.read(&mut sensors).unwrap();
        assert_eq!(angles.arm1, 0.0);
        assert!((angles.arm2 - core::f32::consts::PI).abs() < 1e-6);
        assert!((angles.turntable - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_failed_read_reports_axis_and_feeds_nothing() {
        let mut sensors = JointSensors::new(Fixed(100), Broken, Fixed(100));
        let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
        assert_eq!(
            acquisition.read(&mut sensors),
            Err(Error::Sensor(Axis::Arm2))
        );
        assert_eq!(acquisition.current(), JointAngles::default());
    }

    #[test]
    fn test_raw_mean_ignores_offsets() {
        let offsets = CalibrationOffsets::new(f32::NAN, 1.0, 0.25);
        let mut acquisition = AngleAcquisition::new(2, offsets);
        acquisition.sample_radians([0.5, 1.5, 2.5]);
        let angles = acquisition.sample_radians([0.7, 1.5, 2.5]);
        assert!(angles.arm1.is_nan());

        let raw = acquisition.current_raw();
        assert!((raw.arm1 - 0.6).abs() < 1e-6);
        assert!((raw.arm2 - 1.5).abs() < 1e-6);
        assert!((raw.turntable - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_offsets_clears_windows() {
        let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
        acquisition.sample_radians([1.0, 1.0, 1.0]);
        acquisition.set_offsets(CalibrationOffsets::new(0.5, 0.5, 0.5));
        assert_eq!(acquisition.current(), JointAngles::default());
        let angles = acquisition.sample_radians([1.0, 1.0, 1.0]);
        assert!((angles.arm1 - 0.5).abs() < 1e-6);
    }
}
