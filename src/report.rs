//! HID report encoding for the two output profiles
//!
//! Vendor report layout (16 bytes, no report ID):
//! ```text
//! Byte  0     : dx       i8, clamped to -127..=127
//! Byte  1     : dy       i8, clamped
//! Byte  2     : dz       i8, clamped
//! Byte  3     : buttons  bit 0 = first, bit 1 = second, bit 2 = third
//! Bytes 4..8  : x        f32 little-endian, millimetres
//! Bytes 8..12 : y        f32 little-endian
//! Bytes 12..16: z        f32 little-endian
//! ```

use nalgebra::Vector3;

use crate::accumulator::Motion;
use crate::buttons::ButtonState;
use crate::error::Error;
use crate::types::Profile;

/// Vendor report size in bytes
pub const VENDOR_REPORT_LEN: usize = 16;

/// Largest displacement a single report can carry
pub const MAX_REPORT_COUNTS: i32 = 127;

/// Most pointer reports one cycle may split its motion into
pub const MAX_POINTER_REPORTS: usize = 16;

/// Transport for outgoing HID reports
///
/// Enumeration and descriptors belong to the implementor; only report
/// payloads cross this seam.
pub trait HidWriter {
    type Error;

    /// Send a standard relative pointer report
    fn write_pointer(&mut self, report: &PointerReport) -> Result<(), Self::Error>;

    /// Send a vendor report payload
    fn write_vendor(&mut self, report: &[u8; VENDOR_REPORT_LEN]) -> Result<(), Self::Error>;
}

impl<T: HidWriter + ?Sized> HidWriter for &mut T {
    type Error = T::Error;

    fn write_pointer(&mut self, report: &PointerReport) -> Result<(), Self::Error> {
        (**self).write_pointer(report)
    }

    fn write_vendor(&mut self, report: &[u8; VENDOR_REPORT_LEN]) -> Result<(), Self::Error> {
        (**self).write_vendor(report)
    }
}

/// Clamp a motion count into the signed byte range a report can hold
#[inline]
pub fn clamp_counts(counts: i32) -> i8 {
    counts.clamp(-MAX_REPORT_COUNTS, MAX_REPORT_COUNTS) as i8
}

/// Standard relative pointer report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerReport {
    pub x: i8,
    pub y: i8,
    pub buttons: u8,
}

/// Vendor report carrying clamped counts and the raw pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VendorReport {
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
    pub buttons: u8,
    pub pose: Vector3<f32>,
}

impl VendorReport {
    pub fn new(motion: Motion, buttons: ButtonState, pose: Vector3<f32>) -> Self {
        Self {
            dx: clamp_counts(motion.x),
            dy: clamp_counts(motion.y),
            dz: clamp_counts(motion.z),
            buttons: buttons.bits(),
            pose,
        }
    }

    pub fn to_bytes(&self) -> [u8; VENDOR_REPORT_LEN] {
        let mut bytes = [0u8; VENDOR_REPORT_LEN];
        bytes[0] = self.dx as u8;
        bytes[1] = self.dy as u8;
        bytes[2] = self.dz as u8;
        bytes[3] = self.buttons;
        bytes[4..8].copy_from_slice(&self.pose.x.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.pose.y.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.pose.z.to_le_bytes());
        bytes
    }

    /// Decode a vendor report, as a host would
    pub fn from_bytes(bytes: &[u8; VENDOR_REPORT_LEN]) -> Self {
        let float = |at: usize| {
            f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Self {
            dx: bytes[0] as i8,
            dy: bytes[1] as i8,
            dz: bytes[2] as i8,
            buttons: bytes[3],
            pose: Vector3::new(float(4), float(8), float(12)),
        }
    }
}

/// Everything one cycle may report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Counts to move, already gated
    pub motion: Motion,
    /// Current reportable button state
    pub buttons: ButtonState,
    /// Whether `buttons` differs from the last reported state
    pub buttons_changed: bool,
    /// Pose in the output frame, millimetres
    pub pose: Vector3<f32>,
}

impl Profile {
    /// Encode `frame` and hand it to `writer`
    ///
    /// Nothing is sent when there is no motion and the buttons did not
    /// change. The pointer profile splits motion beyond ±127 counts over
    /// at most [`MAX_POINTER_REPORTS`] reports and ignores `z`; the vendor
    /// profile sends one report with every count clamped. Returns the
    /// number of reports sent.
    pub fn emit<W: HidWriter>(self, writer: &mut W, frame: &Frame) -> Result<usize, Error> {
        match self {
            Profile::Pointer => emit_pointer(writer, frame),
            Profile::Vendor => emit_vendor(writer, frame),
        }
    }
}

fn emit_pointer<W: HidWriter>(writer: &mut W, frame: &Frame) -> Result<usize, Error> {
    let mut x = frame.motion.x;
    let mut y = frame.motion.y;
    let mut sent = 0;

    if x == 0 && y == 0 && !frame.buttons_changed {
        return Ok(0);
    }

    loop {
        let report = PointerReport {
            x: clamp_counts(x),
            y: clamp_counts(y),
            buttons: frame.buttons.bits(),
        };
        writer.write_pointer(&report).map_err(|_| {
            warn!("pointer report rejected");
            Error::Report
        })?;
        sent += 1;
        x -= i32::from(report.x);
        y -= i32::from(report.y);
        if x == 0 && y == 0 {
            return Ok(sent);
        }
        if sent == MAX_POINTER_REPORTS {
            warn!("dropping {} {} counts beyond the report limit", x, y);
            return Ok(sent);
        }
    }
}

fn emit_vendor<W: HidWriter>(writer: &mut W, frame: &Frame) -> Result<usize, Error> {
    if frame.motion.is_zero() && !frame.buttons_changed {
        return Ok(0);
    }
    let report = VendorReport::new(frame.motion, frame.buttons, frame.pose);
    writer.write_vendor(&report.to_bytes()).map_err(|_| {
        warn!("vendor report rejected");
        Error::Report
    })?;
    Ok(1)
}
