//! The sampling loop: sensors in, HID reports out

use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use nalgebra::Vector3;

use crate::accumulator::{Motion, MotionAccumulator, is_touching};
use crate::acquisition::{AngleAcquisition, AngleSource, JointAngles};
use crate::buttons::{ButtonEvents, ButtonSource, ButtonTracker};
use crate::calibration::{self, CalibrationOffsets, CalibrationStore};
use crate::error::Error;
use crate::report::{Frame, HidWriter};
use crate::types::TrackerSettings;

/// Result of one pipeline cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// Smoothed, calibrated joint angles
    pub angles: JointAngles,
    /// Stylus pose in the output frame, millimetres
    pub pose: Vector3<f32>,
    /// Arm-frame height of the stylus used by the contact gate
    pub height: f32,
    /// Whether the stylus counted as touching
    pub touching: bool,
    /// Gated motion handed to the HID profile
    pub motion: Motion,
    /// Button edges seen this cycle
    pub buttons: ButtonEvents,
    /// New offsets when this cycle re-zeroed the pose
    pub calibrated: Option<CalibrationOffsets>,
    /// Number of HID reports sent
    pub reports: usize,
}

/// Pose tracker and HID reporter for the arm
///
/// Owns the hardware seams and all pipeline state. Each [`step`](Self::step)
/// reads the encoders and buttons once, updates the pose and emits
/// whatever HID reports the cycle produced. Nothing runs concurrently with
/// a step, so a calibration always completes before the next sample.
///
/// # Type parameters
/// * `J` - joint angle source, usually [`JointSensors`](crate::JointSensors)
/// * `K` - button source, usually [`Buttons`](crate::Buttons)
/// * `S` - non-volatile storage holding the calibration record
/// * `W` - HID transport
pub struct Tracker<J, K, S, W> {
    sensors: J,
    buttons: K,
    store: CalibrationStore<S>,
    writer: W,
    settings: TrackerSettings,
    acquisition: AngleAcquisition,
    accumulator: MotionAccumulator,
    button_tracker: ButtonTracker,
    calibration_found: bool,
    consecutive_faults: u32,
}

impl<J, K, S, W> Tracker<J, K, S, W>
where
    J: AngleSource,
    K: ButtonSource,
    S: Storage,
    W: HidWriter,
{
    /// Create a tracker, restoring the stored calibration
    ///
    /// Erased storage is not an error: the tracker starts with zero
    /// offsets and [`calibration_found`](Self::calibration_found) is false.
    /// A `fault_limit` of zero is raised to one.
    pub fn new(
        sensors: J,
        buttons: K,
        storage: S,
        writer: W,
        mut settings: TrackerSettings,
    ) -> Result<Self, Error> {
        settings.fault_limit = settings.fault_limit.max(1);
        let mut store = CalibrationStore::new(storage, settings.storage_address);
        let stored = store.load()?;

        info!(
            "tracker ready, profile {}, frame {}, calibrated {}",
            settings.profile,
            settings.frame,
            stored.is_found()
        );

        Ok(Self {
            sensors,
            buttons,
            store,
            writer,
            acquisition: AngleAcquisition::new(settings.smoothing_window, stored.offsets()),
            accumulator: MotionAccumulator::new(),
            button_tracker: ButtonTracker::new(settings.calibration_button),
            calibration_found: stored.is_found(),
            consecutive_faults: 0,
            settings,
        })
    }

    /// Run one sample, kinematics, accumulate and report cycle
    ///
    /// A failed sensor read skips the cycle. Once reads have failed
    /// `fault_limit` times in a row, [`Error::SensorsStalled`] is returned
    /// instead and the motion reference is dropped, so the first good read
    /// afterwards only re-establishes the pose.
    ///
    /// When the transport rejects a report the cycle's motion is lost, but
    /// a button change stays pending and is sent on a later cycle. A
    /// calibration press is acted on either way.
    pub fn step(&mut self) -> Result<Cycle, Error> {
        let raw = match self.sensors.read_raw() {
            Ok(raw) => raw,
            Err(error) => return Err(self.record_fault(error)),
        };
        if self.consecutive_faults > 0 {
            if self.is_stalled() {
                info!("angle sensors recovered");
            }
            self.consecutive_faults = 0;
        }

        let angles = self.acquisition.sample_raw(raw);
        let arm_pose = self.settings.geometry.position(&angles);
        let height = arm_pose.z;
        let pose = self.settings.frame.apply(arm_pose);

        let touching = is_touching(height, self.settings.contact_height);
        let motion = self
            .accumulator
            .integrate(pose, self.settings.sensitivity)
            .gated(touching);

        let buttons = self.button_tracker.update(self.buttons.read());

        let frame = Frame {
            motion,
            buttons: buttons.report.unwrap_or(self.button_tracker.sent()),
            buttons_changed: buttons.report.is_some(),
            pose,
        };
        let emitted = self.settings.profile.emit(&mut self.writer, &frame);
        if let (Ok(_), Some(state)) = (&emitted, buttons.report) {
            self.button_tracker.confirm(state);
        }

        // The press edge is consumed, so calibrate even if reporting failed
        let calibrated = buttons.calibrate.then(|| self.calibrate());
        let reports = emitted?;
        let calibrated = calibrated.transpose()?;

        trace!(
            "pose {} {} {} motion {} {} {}",
            pose.x,
            pose.y,
            pose.z,
            motion.x,
            motion.y,
            motion.z
        );

        Ok(Cycle {
            angles,
            pose,
            height,
            touching,
            motion,
            buttons,
            calibrated,
            reports,
        })
    }

    /// Make the current pose the logical zero and persist it
    ///
    /// Uses the smoothed, uncalibrated angles of the recent cycles, so the
    /// result does not depend on the previous offsets. Smoothing and the
    /// motion reference restart from the new zero, so re-zeroing never
    /// produces a motion burst. The new offsets are applied even if
    /// writing them to storage fails.
    pub fn calibrate(&mut self) -> Result<CalibrationOffsets, Error> {
        let offsets = calibration::calibrate(self.acquisition.current_raw());
        self.acquisition.set_offsets(offsets);
        self.accumulator.reset();
        self.store.persist(&offsets)?;
        self.calibration_found = true;
        info!(
            "calibrated, offsets {} {} {}",
            offsets.arm1,
            offsets.arm2,
            offsets.turntable
        );
        Ok(offsets)
    }

    /// Step forever, pausing `loop_period_us` between cycles when set
    ///
    /// Errors are logged and the loop carries on; a stalled sensor keeps
    /// motion output suspended until it reads again.
    pub fn run<D: DelayNs>(&mut self, delay: &mut D) -> ! {
        loop {
            if let Err(error) = self.step() {
                debug!("cycle skipped: {}", error);
            }
            if let Some(period) = self.settings.loop_period_us {
                delay.delay_us(period);
            }
        }
    }

    fn record_fault(&mut self, error: Error) -> Error {
        self.consecutive_faults = self.consecutive_faults.saturating_add(1);
        if self.consecutive_faults < self.settings.fault_limit {
            return error;
        }
        if self.consecutive_faults == self.settings.fault_limit {
            warn!(
                "angle sensors stalled after {} failures, motion suspended",
                self.consecutive_faults
            );
            self.accumulator.reset();
        }
        Error::SensorsStalled(self.consecutive_faults)
    }

    /// Whether motion output is suspended by repeated sensor failures
    pub fn is_stalled(&self) -> bool {
        self.consecutive_faults >= self.settings.fault_limit
    }

    pub fn consecutive_faults(&self) -> u32 {
        self.consecutive_faults
    }

    /// Whether offsets were restored from storage or set since startup
    pub fn calibration_found(&self) -> bool {
        self.calibration_found
    }

    pub fn offsets(&self) -> CalibrationOffsets {
        self.acquisition.offsets()
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn sensors_mut(&mut self) -> &mut J {
        &mut self.sensors
    }

    pub fn buttons_mut(&mut self) -> &mut K {
        &mut self.buttons
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Tear down and give back the hardware
    pub fn release(self) -> (J, K, S, W) {
        (self.sensors, self.buttons, self.store.release(), self.writer)
    }
}
