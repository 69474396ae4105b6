//! Push-button polling and change detection

use embedded_hal::digital::InputPin;

use crate::types::Button;

/// Bitmask of pressed buttons, bit `i` for [`Button`] `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState(pub u8);

impl ButtonState {
    pub const NONE: Self = Self(0);

    pub fn is_pressed(&self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn with(self, button: Button, pressed: bool) -> Self {
        if pressed {
            Self(self.0 | button.mask())
        } else {
            Self(self.0 & !button.mask())
        }
    }

    /// Buttons pressed in `self` but not in `previous`
    pub fn pressed_since(self, previous: ButtonState) -> Self {
        Self(self.0 & !previous.0)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Source of the raw button state
pub trait ButtonSource {
    fn read(&mut self) -> ButtonState;
}

/// The three button inputs, wired to ground with pull-ups
///
/// Inputs are expected to be debounced already; a pin reading low is a
/// pressed button.
pub struct Buttons<P1, P2, P3> {
    first: P1,
    second: P2,
    third: P3,
}

impl<P1, P2, P3> Buttons<P1, P2, P3>
where
    P1: InputPin,
    P2: InputPin,
    P3: InputPin,
{
    pub fn new(first: P1, second: P2, third: P3) -> Self {
        Self {
            first,
            second,
            third,
        }
    }
}

impl<P1, P2, P3> ButtonSource for Buttons<P1, P2, P3>
where
    P1: InputPin,
    P2: InputPin,
    P3: InputPin,
{
    /// Sample all three inputs
    ///
    /// A pin that fails to read counts as released.
    fn read(&mut self) -> ButtonState {
        ButtonState::NONE
            .with(Button::First, pressed(&mut self.first, Button::First))
            .with(Button::Second, pressed(&mut self.second, Button::Second))
            .with(Button::Third, pressed(&mut self.third, Button::Third))
    }
}

fn pressed<P: InputPin>(pin: &mut P, button: Button) -> bool {
    pin.is_low().unwrap_or_else(|_| {
        warn!("button {} read failed", button);
        false
    })
}

/// What a new button sample asks the pipeline to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvents {
    /// The calibration button was just pressed
    pub calibrate: bool,
    /// Button state to report, present only when it changed
    pub report: Option<ButtonState>,
}

/// Edge and change detection over successive button samples
///
/// # Example
/// ```
/// use arm_pointer::{Button, ButtonState, ButtonTracker};
///
/// let mut tracker = ButtonTracker::new(Some(Button::Third));
/// let left = ButtonState::NONE.with(Button::First, true);
/// assert_eq!(tracker.update(left).report, Some(left));
/// // Still pending until the host has it
/// assert_eq!(tracker.update(left).report, Some(left));
/// tracker.confirm(left);
/// assert_eq!(tracker.update(left).report, None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ButtonTracker {
    calibration_button: Option<Button>,
    previous: ButtonState,
    sent: ButtonState,
}

impl ButtonTracker {
    pub fn new(calibration_button: Option<Button>) -> Self {
        Self {
            calibration_button,
            previous: ButtonState::NONE,
            sent: ButtonState::NONE,
        }
    }

    /// Process one sample of the raw button state
    ///
    /// The calibration button is never reported; its press edge sets
    /// [`ButtonEvents::calibrate`] instead. A state in
    /// [`ButtonEvents::report`] stays pending, and is reported again on
    /// every update, until it is passed to [`confirm`](Self::confirm).
    pub fn update(&mut self, raw: ButtonState) -> ButtonEvents {
        let pressed = raw.pressed_since(self.previous);
        self.previous = raw;

        let (forwarded, calibrate) = match self.calibration_button {
            Some(button) => (raw.with(button, false), pressed.is_pressed(button)),
            None => (raw, false),
        };

        let report = (forwarded != self.sent).then_some(forwarded);

        ButtonEvents { calibrate, report }
    }

    /// Record that `state` reached the host
    pub fn confirm(&mut self, state: ButtonState) {
        self.sent = state;
    }

    /// Last button state the host acknowledged
    pub fn sent(&self) -> ButtonState {
        self.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_low_pin_is_pressed() {
        let mut buttons = Buttons::new(Level(false), Level(true), Level(false));
        let state = buttons.read();
        assert!(state.is_pressed(Button::First));
        assert!(!state.is_pressed(Button::Second));
        assert!(state.is_pressed(Button::Third));
        assert_eq!(state.bits(), 0b101);
    }

    #[test]
    fn test_identical_samples_report_once() {
        let mut tracker = ButtonTracker::new(None);
        let state = ButtonState(0b010);
        assert_eq!(tracker.update(state).report, Some(state));
        tracker.confirm(state);
        assert_eq!(tracker.update(state).report, None);
        assert_eq!(tracker.sent(), state);
    }

    #[test]
    fn test_unconfirmed_change_stays_pending() {
        let mut tracker = ButtonTracker::new(None);
        let state = ButtonState(0b001);
        assert_eq!(tracker.update(state).report, Some(state));
        assert_eq!(tracker.sent(), ButtonState::NONE);
        assert_eq!(tracker.update(state).report, Some(state));
        tracker.confirm(state);
        assert_eq!(tracker.update(state).report, None);
    }

    #[test]
    fn test_release_is_reported() {
        let mut tracker = ButtonTracker::new(None);
        let pressed = ButtonState(0b001);
        tracker.update(pressed);
        tracker.confirm(pressed);
        assert_eq!(
            tracker.update(ButtonState::NONE).report,
            Some(ButtonState::NONE)
        );
    }

    #[test]
    fn test_idle_start_reports_nothing() {
        let mut tracker = ButtonTracker::new(None);
        assert_eq!(tracker.update(ButtonState::NONE), ButtonEvents::default());
    }

    #[test]
    fn test_calibration_button_fires_on_press_edge_only() {
        let mut tracker = ButtonTracker::new(Some(Button::Third));
        let held = ButtonState::NONE.with(Button::Third, true);

        let events = tracker.update(held);
        assert!(events.calibrate);
        assert_eq!(events.report, None);

        let events = tracker.update(held);
        assert!(!events.calibrate);

        tracker.update(ButtonState::NONE);
        assert!(tracker.update(held).calibrate);
    }

    #[test]
    fn test_calibration_button_is_masked_from_reports() {
        let mut tracker = ButtonTracker::new(Some(Button::Third));
        let events = tracker.update(ButtonState(0b101));
        assert!(events.calibrate);
        assert_eq!(events.report, Some(ButtonState(0b001)));
    }

    #[test]
    fn test_pressed_since() {
        let previous = ButtonState(0b011);
        let current = ButtonState(0b110);
        assert_eq!(current.pressed_since(previous), ButtonState(0b100));
    }
}
