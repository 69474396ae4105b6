//! Error type for the tracking pipeline

use crate::types::Axis;

/// Pipeline failure
///
/// Driver error values are logged where they occur and not carried, so
/// the error stays `Copy` and independent of the hardware types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An angle sensor read failed; the cycle was skipped
    #[error("angle sensor read failed on {0:?}")]
    Sensor(Axis),
    /// Sensor reads have failed for `fault_limit` consecutive cycles and
    /// motion output is suspended until a read succeeds
    #[error("angle sensors stalled after {0} consecutive failures")]
    SensorsStalled(u32),
    /// Non-volatile storage read or write failed
    #[error("calibration storage access failed")]
    Storage,
    /// The HID transport rejected a report
    #[error("HID report could not be sent")]
    Report,
}
