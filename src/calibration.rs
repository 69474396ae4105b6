//! Zero-pose calibration and its non-volatile record
//!
//! The record is 12 bytes: three little-endian IEEE-754 `f32` offsets in
//! radians, in the order arm 1, arm 2, turntable. It has no checksum or
//! version tag; a record that is entirely `0xFF` (erased flash) means no
//! calibration has been stored.

use embedded_storage::Storage;

use crate::acquisition::JointAngles;
use crate::error::Error;
use crate::math::wrap_angle;
use crate::types::Axis;

/// Size of the stored calibration record in bytes
pub const RECORD_LEN: usize = 12;

/// Value of every byte of erased non-volatile storage
pub const ERASED_BYTE: u8 = 0xFF;

/// Per-axis zero offsets in radians
///
/// # Example
/// ```
/// use arm_pointer::CalibrationOffsets;
///
/// let offsets = CalibrationOffsets::new(1.0, 2.0, 0.5);
/// let record = offsets.to_bytes();
/// assert_eq!(CalibrationOffsets::from_bytes(&record), offsets);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationOffsets {
    pub arm1: f32,
    pub arm2: f32,
    pub turntable: f32,
}

impl CalibrationOffsets {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(arm1: f32, arm2: f32, turntable: f32) -> Self {
        Self {
            arm1,
            arm2,
            turntable,
        }
    }

    /// Offset of a single axis
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Arm1 => self.arm1,
            Axis::Arm2 => self.arm2,
            Axis::Turntable => self.turntable,
        }
    }

    /// Encode as the fixed 12-byte storage record
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        for (chunk, value) in record
            .chunks_exact_mut(4)
            .zip([self.arm1, self.arm2, self.turntable])
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        record
    }

    /// Decode a 12-byte storage record
    ///
    /// Any bit pattern decodes; a corrupted record yields wrong but
    /// well-typed offsets.
    pub fn from_bytes(record: &[u8; RECORD_LEN]) -> Self {
        let field = |i: usize| {
            f32::from_le_bytes([
                record[i * 4],
                record[i * 4 + 1],
                record[i * 4 + 2],
                record[i * 4 + 3],
            ])
        };
        Self::new(field(0), field(1), field(2))
    }
}

impl From<JointAngles> for CalibrationOffsets {
    fn from(angles: JointAngles) -> Self {
        Self::new(angles.arm1, angles.arm2, angles.turntable)
    }
}

/// Outcome of reading the calibration record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoredCalibration {
    /// A record was present and decoded
    Found(CalibrationOffsets),
    /// Storage is erased; no calibration was ever saved
    Uninitialized,
}

impl StoredCalibration {
    /// Offsets to apply, zero when nothing was stored
    pub fn offsets(&self) -> CalibrationOffsets {
        match self {
            StoredCalibration::Found(offsets) => *offsets,
            StoredCalibration::Uninitialized => CalibrationOffsets::ZERO,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, StoredCalibration::Found(_))
    }
}

/// Compute offsets that make the current pose the logical zero
///
/// `raw` are the smoothed angles measured with no offsets applied. Each is
/// wrapped into `[0, 2π)` and becomes the new offset, so whatever offsets
/// were active before have no influence.
///
/// # Example
/// ```
/// use arm_pointer::{CalibrationOffsets, JointAngles, calibrate};
///
/// let raw = JointAngles::new(1.0, 2.0, 0.5);
/// assert_eq!(calibrate(raw), CalibrationOffsets::new(1.0, 2.0, 0.5));
/// ```
pub fn calibrate(raw: JointAngles) -> CalibrationOffsets {
    CalibrationOffsets::new(
        wrap_angle(raw.arm1),
        wrap_angle(raw.arm2),
        wrap_angle(raw.turntable),
    )
}

/// Calibration record persisted in non-volatile storage
pub struct CalibrationStore<S> {
    storage: S,
    address: u32,
}

impl<S: Storage> CalibrationStore<S> {
    /// Store the record at `address`
    pub fn new(storage: S, address: u32) -> Self {
        Self { storage, address }
    }

    /// Read the record
    ///
    /// An all-`0xFF` record returns [`StoredCalibration::Uninitialized`].
    pub fn load(&mut self) -> Result<StoredCalibration, Error> {
        let mut record = [0u8; RECORD_LEN];
        self.storage.read(self.address, &mut record).map_err(|_| {
            warn!("calibration read failed at {=u32:#x}", self.address);
            Error::Storage
        })?;

        if record.iter().all(|&byte| byte == ERASED_BYTE) {
            info!("no stored calibration, using zero offsets");
            return Ok(StoredCalibration::Uninitialized);
        }

        let offsets = CalibrationOffsets::from_bytes(&record);
        debug!(
            "loaded calibration {} {} {}",
            offsets.arm1,
            offsets.arm2,
            offsets.turntable
        );
        Ok(StoredCalibration::Found(offsets))
    }

    /// Write the record, leaving all other bytes untouched
    pub fn persist(&mut self, offsets: &CalibrationOffsets) -> Result<(), Error> {
        self.storage
            .write(self.address, &offsets.to_bytes())
            .map_err(|_| {
                warn!("calibration write failed at {=u32:#x}", self.address);
                Error::Storage
            })
    }

    /// Byte address of the record
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Give back the storage
    pub fn release(self) -> S {
        self.storage
    }
}
