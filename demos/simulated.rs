//! Host-side simulation of the arm pointer
//!
//! Drives the full tracker with simulated encoders, buttons, flash and a HID
//! transport that prints each report. The encoders are mounted with an
//! arbitrary zero, so the arm is first held straight up and re-zeroed with
//! the calibration button. The stylus is then lowered onto the desk and
//! swept in an arc while the first button is held.
//!
//! Run with: `cargo run --example simulated`

use arm_pointer::report::VENDOR_REPORT_LEN;
use arm_pointer::{
    AngleSensor, Button, ButtonSource, ButtonState, HidWriter, JointSensors, OutputFrame,
    PointerReport, Tracker, TrackerSettings,
};
use embedded_storage::{ReadStorage, Storage};
use std::convert::Infallible;
use std::f32::consts::TAU;

const STEPS: usize = 60;

/// Encoder reading a joint angle in radians, mounted `offset` away from zero
struct Encoder {
    angle: f32,
    offset: f32,
}

impl Encoder {
    fn mounted(offset: f32) -> Self {
        Self { angle: 0.0, offset }
    }
}

impl AngleSensor for Encoder {
    type Error = Infallible;

    fn read_raw(&mut self) -> Result<u16, Infallible> {
        let counts = ((self.angle + self.offset).rem_euclid(TAU) / TAU * 4096.0) as u16;
        Ok(counts.min(4095))
    }
}

struct Panel(ButtonState);

impl ButtonSource for Panel {
    fn read(&mut self) -> ButtonState {
        self.0
    }
}

struct Flash([u8; 256]);

impl ReadStorage for Flash {
    type Error = ();

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), ()> {
        let start = offset as usize;
        bytes.copy_from_slice(self.0.get(start..start + bytes.len()).ok_or(())?);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.len()
    }
}

impl Storage for Flash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), ()> {
        let start = offset as usize;
        self.0
            .get_mut(start..start + bytes.len())
            .ok_or(())?
            .copy_from_slice(bytes);
        Ok(())
    }
}

struct Console;

impl HidWriter for Console {
    type Error = Infallible;

    fn write_pointer(&mut self, report: &PointerReport) -> Result<(), Self::Error> {
        println!(
            "    HID pointer  dx {:4}  dy {:4}  buttons {:03b}",
            report.x, report.y, report.buttons
        );
        Ok(())
    }

    fn write_vendor(&mut self, report: &[u8; VENDOR_REPORT_LEN]) -> Result<(), Self::Error> {
        println!("    HID vendor   {report:02x?}");
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Arm pointer simulation");

    let settings = TrackerSettings {
        frame: OutputFrame::Arm,
        contact_height: Some(-150.0),
        sensitivity: 4.0,
        ..Default::default()
    };

    let sensors = JointSensors::new(
        Encoder::mounted(2.1),
        Encoder::mounted(5.3),
        Encoder::mounted(0.4),
    );
    let mut tracker = Tracker::new(
        sensors,
        Panel(ButtonState::NONE),
        Flash([0xFF; 256]),
        Console,
        settings,
    )?;
    println!("stored calibration found: {}", tracker.calibration_found());

    for step in 0..STEPS {
        let t = step as f32 / STEPS as f32;

        // Upright, then lower the stylus until t = 0.4, then sweep the turntable
        let lowering = ((t - 0.1) / 0.3).clamp(0.0, 1.0);
        let shoulder = 1.6 * lowering;
        let elbow = 1.0 * lowering;
        let turntable = (t - 0.4).max(0.0) * 0.8;

        {
            let sensors = tracker.sensors_mut();
            sensors.arm1.angle = shoulder;
            sensors.arm2.angle = elbow;
            sensors.turntable.angle = turntable;
        }

        // Tap the calibration button while upright, hold button one while drawing
        let buttons = match step {
            3 => ButtonState::NONE.with(Button::Third, true),
            s if s > 30 => ButtonState::NONE.with(Button::First, true),
            _ => ButtonState::NONE,
        };
        tracker.buttons_mut().0 = buttons;

        let cycle = tracker.step()?;
        println!(
            "step {step:2}  pose ({:7.1}, {:7.1}, {:7.1}) mm  touching {:5}  motion ({:4}, {:4}, {:4})",
            cycle.pose.x,
            cycle.pose.y,
            cycle.pose.z,
            cycle.touching,
            cycle.motion.x,
            cycle.motion.y,
            cycle.motion.z
        );
        if let Some(offsets) = cycle.calibrated {
            println!(
                "    calibrated: offsets {:.3} {:.3} {:.3} rad",
                offsets.arm1, offsets.arm2, offsets.turntable
            );
        }
    }

    let (_, _, flash, _) = tracker.release();
    println!("stored record: {:02x?}", &flash.0[..12]);

    Ok(())
}
