#![no_std]

//! [![license]](https://opensource.org/licenses/MIT)
//!
//! [license]: https://img.shields.io/badge/License-MIT-blue.svg?style=for-the-badge&labelColor=555555
//!
//! Arm Pointer - pose tracking and relative-motion HID reporting for an articulated arm
//!
//! The device is a two-link arm on a turntable with a 12-bit absolute rotary
//! encoder on each joint and a stylus at the tip. This crate turns encoder
//! readings into a stylus position in millimetres and reports the change in
//! that position as HID pointer motion, so moving the stylus over a desk
//! moves the cursor.
//!
//! # Features
//!
//! - Per-axis moving-average smoothing of the joint angles
//! - Calibration offsets persisted in non-volatile storage
//! - Forward kinematics for the shoulder, elbow and turntable joints
//! - Lossless integer motion with fractional remainder carry
//! - Optional contact gate on stylus height
//! - Standard pointer and vendor HID report profiles
//! - Hardware access through `embedded-hal` and `embedded-storage` traits
//! - `#![no_std]` compatible, optional `defmt` logging
//!
//! # Quick Start
//!
//! ```rust
//! use arm_pointer::{AngleAcquisition, ArmGeometry, CalibrationOffsets, MotionAccumulator, OutputFrame};
//!
//! let geometry = ArmGeometry::default();
//! let mut acquisition = AngleAcquisition::new(3, CalibrationOffsets::ZERO);
//! let mut accumulator = MotionAccumulator::new();
//!
//! // Raw 12-bit encoder readings: arm 1, arm 2, turntable
//! let mut moved = 0;
//! for raw in [[1024, 0, 0], [1024, 0, 4], [1024, 0, 8]] {
//!     let angles = acquisition.sample_raw(raw);
//!     let pose = OutputFrame::Upright.apply(geometry.position(&angles));
//!     let motion = accumulator.integrate(pose, 10.0);
//!     moved += motion.z;
//! }
//!
//! // Swinging the turntable moves the stylus sideways across the desk
//! assert!(moved > 0);
//! ```
//!
//! On hardware the whole pipeline is driven by a [`Tracker`], which owns the
//! sensors, buttons, calibration storage and HID transport.

#[macro_use]
mod fmt;

pub mod accumulator;
pub mod acquisition;
pub mod buttons;
pub mod calibration;
mod error;
pub mod kinematics;
pub mod math;
pub mod report;
mod smoothing;
pub mod tracker;
mod types;

pub use accumulator::{Motion, MotionAccumulator};
pub use acquisition::{AngleAcquisition, AngleSensor, AngleSource, JointAngles, JointSensors};
pub use buttons::{ButtonEvents, ButtonSource, ButtonState, ButtonTracker, Buttons};
pub use calibration::{CalibrationOffsets, CalibrationStore, StoredCalibration, calibrate};
pub use error::Error;
pub use report::{Frame, HidWriter, PointerReport, VendorReport};
pub use smoothing::{MAX_SMOOTHING_WINDOW, SmoothingWindow};
pub use tracker::{Cycle, Tracker};
pub use types::*;
