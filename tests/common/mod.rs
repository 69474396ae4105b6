//! Simulated hardware for driving the tracker on the host

#![allow(dead_code)]

use arm_pointer::report::VENDOR_REPORT_LEN;
use arm_pointer::{
    AngleSensor, ButtonSource, ButtonState, HidWriter, JointSensors, PointerReport, Tracker,
    TrackerSettings,
};
use embedded_storage::{ReadStorage, Storage};

/// Encoder that returns a settable reading
#[derive(Debug, Default)]
pub struct SimEncoder {
    pub raw: u16,
    pub fail: bool,
}

impl SimEncoder {
    pub fn at(raw: u16) -> Self {
        Self { raw, fail: false }
    }
}

impl AngleSensor for SimEncoder {
    type Error = &'static str;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        if self.fail {
            Err("bus timeout")
        } else {
            Ok(self.raw)
        }
    }
}

pub type SimSensors = JointSensors<SimEncoder, SimEncoder, SimEncoder>;

pub fn sensors(raw: [u16; 3]) -> SimSensors {
    JointSensors::new(
        SimEncoder::at(raw[0]),
        SimEncoder::at(raw[1]),
        SimEncoder::at(raw[2]),
    )
}

pub fn set_raw(sensors: &mut SimSensors, raw: [u16; 3]) {
    sensors.arm1.raw = raw[0];
    sensors.arm2.raw = raw[1];
    sensors.turntable.raw = raw[2];
}

/// Buttons whose state the test sets directly
#[derive(Debug, Default)]
pub struct SimButtons(pub ButtonState);

impl ButtonSource for SimButtons {
    fn read(&mut self) -> ButtonState {
        self.0
    }
}

/// Byte-addressed flash that starts erased
#[derive(Debug)]
pub struct Flash {
    pub bytes: Vec<u8>,
    pub fail_writes: bool,
    pub writes: usize,
}

impl Flash {
    pub fn erased(size: usize) -> Self {
        Self {
            bytes: vec![0xFF; size],
            fail_writes: false,
            writes: 0,
        }
    }
}

impl ReadStorage for Flash {
    type Error = ();

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), ()> {
        let start = offset as usize;
        let source = self.bytes.get(start..start + bytes.len()).ok_or(())?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for Flash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        let start = offset as usize;
        let target = self.bytes.get_mut(start..start + bytes.len()).ok_or(())?;
        target.copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

/// HID transport that records every report
///
/// While `rejections` is non-zero each write is refused and counts it down.
#[derive(Debug, Default)]
pub struct Recorder {
    pub pointer: Vec<PointerReport>,
    pub vendor: Vec<[u8; VENDOR_REPORT_LEN]>,
    pub rejections: usize,
}

impl Recorder {
    pub fn total_x(&self) -> i32 {
        self.pointer.iter().map(|r| i32::from(r.x)).sum()
    }

    pub fn total_y(&self) -> i32 {
        self.pointer.iter().map(|r| i32::from(r.y)).sum()
    }

    fn accept(&mut self) -> Result<(), &'static str> {
        if self.rejections > 0 {
            self.rejections -= 1;
            return Err("endpoint busy");
        }
        Ok(())
    }
}

impl HidWriter for Recorder {
    type Error = &'static str;

    fn write_pointer(&mut self, report: &PointerReport) -> Result<(), Self::Error> {
        self.accept()?;
        self.pointer.push(*report);
        Ok(())
    }

    fn write_vendor(&mut self, report: &[u8; VENDOR_REPORT_LEN]) -> Result<(), Self::Error> {
        self.accept()?;
        self.vendor.push(*report);
        Ok(())
    }
}

pub type SimTracker = Tracker<SimSensors, SimButtons, Flash, Recorder>;

/// Tracker over erased flash with the given settings
pub fn tracker(raw: [u16; 3], settings: TrackerSettings) -> SimTracker {
    tracker_with_flash(raw, Flash::erased(64), settings)
}

pub fn tracker_with_flash(raw: [u16; 3], flash: Flash, settings: TrackerSettings) -> SimTracker {
    Tracker::new(
        sensors(raw),
        SimButtons::default(),
        flash,
        Recorder::default(),
        settings,
    )
    .expect("flash is readable")
}
