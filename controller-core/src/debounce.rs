//! Debounced digital button input.

use embedded_hal::digital::InputPin;

use crate::input::{InputError, InputSource};
use crate::types::{Buttons, InputState};

/// Default time a button is locked after it changes state.
pub const DEFAULT_HOLD_OFF_US: u64 = 5_000;

/// Monotonic microsecond clock.
pub trait Clock {
    fn now_micros(&self) -> u64;
}

/// One debounced button: the pin and its filter state.
struct DebouncedPin<P> {
    button: Buttons,
    pin: P,
    pressed: bool,
    last_change_us: Option<u64>,
}

/// Reads a fixed set of active-low buttons with eager debouncing.
///
/// A raw level change is accepted immediately, then that button ignores
/// further changes until `hold_off_us` has passed. Presses therefore have no
/// added latency, and contact bounce right after an edge is suppressed.
pub struct DebouncedButtonInput<P, C, const N: usize> {
    pins: [DebouncedPin<P>; N],
    clock: C,
    hold_off_us: u64,
}

impl<P: InputPin, C: Clock, const N: usize> DebouncedButtonInput<P, C, N> {
    /// Create an input from `(button, pin)` pairs with the default hold-off.
    pub fn new(pins: [(Buttons, P); N], clock: C) -> Self {
        Self::with_hold_off(pins, clock, DEFAULT_HOLD_OFF_US)
    }

    /// Create an input with a custom hold-off time.
    pub fn with_hold_off(pins: [(Buttons, P); N], clock: C, hold_off_us: u64) -> Self {
        Self {
            pins: pins.map(|(button, pin)| DebouncedPin {
                button,
                pin,
                pressed: false,
                last_change_us: None,
            }),
            clock,
            hold_off_us,
        }
    }

    /// Buttons currently considered pressed.
    #[must_use]
    pub fn pressed(&self) -> Buttons {
        let mut buttons = Buttons::NONE;
        for p in &self.pins {
            buttons.set(p.button, p.pressed);
        }
        buttons
    }
}

impl<P: InputPin, C: Clock, const N: usize> InputSource for DebouncedButtonInput<P, C, N> {
    fn update_inputs(&mut self, inputs: &mut InputState) -> Result<(), InputError> {
        let now = self.clock.now_micros();
        let mut owned = Buttons::NONE;
        let mut pressed = Buttons::NONE;

        for p in self.pins.iter_mut() {
            // Pull-up inputs: a held button reads low.
            let raw = p.pin.is_low().map_err(|_| InputError::Io)?;

            let locked = p
                .last_change_us
                .is_some_and(|t| now.saturating_sub(t) < self.hold_off_us);
            if raw != p.pressed && !locked {
                p.pressed = raw;
                p.last_change_us = Some(now);
            }

            owned |= p.button;
            pressed.set(p.button, p.pressed);
        }

        // Single write of the button word; bits of other sources are kept.
        inputs.buttons = (inputs.buttons & !owned) | pressed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::Cell;
    use std::rc::Rc;

    /// Pin whose level is shared with the test body.
    #[derive(Clone)]
    struct FakePin {
        low: Rc<Cell<bool>>,
        fail: Rc<Cell<bool>>,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = PinFault;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            if self.fail.get() {
                Err(PinFault)
            } else {
                Ok(self.low.get())
            }
        }
    }

    struct FakeClock(Rc<Cell<u64>>);

    impl Clock for FakeClock {
        fn now_micros(&self) -> u64 {
            self.0.get()
        }
    }

    struct Rig {
        a: FakePin,
        b: FakePin,
        time: Rc<Cell<u64>>,
        input: DebouncedButtonInput<FakePin, FakeClock, 2>,
    }

    fn rig() -> Rig {
        let pin = || FakePin {
            low: Rc::new(Cell::new(false)),
            fail: Rc::new(Cell::new(false)),
        };
        let a = pin();
        let b = pin();
        let time = Rc::new(Cell::new(0));
        let input = DebouncedButtonInput::new(
            [(Buttons::RT2, a.clone()), (Buttons::LF1, b.clone())],
            FakeClock(time.clone()),
        );
        Rig { a, b, time, input }
    }

    fn sample(rig: &mut Rig) -> Buttons {
        let mut state = InputState::neutral();
        rig.input.update_inputs(&mut state).unwrap();
        state.buttons
    }

    #[test]
    fn test_press_is_reported_immediately() {
        let mut rig = rig();
        assert_eq!(sample(&mut rig), Buttons::NONE);

        rig.a.low.set(true);
        assert_eq!(sample(&mut rig), Buttons::RT2);
        assert_eq!(rig.input.pressed(), Buttons::RT2);
    }

    #[test]
    fn test_bounce_inside_hold_off_is_ignored() {
        let mut rig = rig();
        rig.a.low.set(true);
        assert_eq!(sample(&mut rig), Buttons::RT2);

        // Contact bounces open 1 ms after the edge.
        rig.time.set(1_000);
        rig.a.low.set(false);
        assert_eq!(sample(&mut rig), Buttons::RT2);

        // Still released after the hold-off: the release is accepted.
        rig.time.set(DEFAULT_HOLD_OFF_US);
        assert_eq!(sample(&mut rig), Buttons::NONE);
    }

    #[test]
    fn test_buttons_debounce_independently() {
        let mut rig = rig();
        rig.a.low.set(true);
        sample(&mut rig);

        rig.time.set(100);
        rig.b.low.set(true);
        assert_eq!(sample(&mut rig), Buttons::RT2 | Buttons::LF1);
    }

    #[test]
    fn test_foreign_bits_are_preserved() {
        let mut rig = rig();
        rig.b.low.set(true);
        let mut state = InputState {
            buttons: Buttons::MB2,
            ..InputState::neutral()
        };
        rig.input.update_inputs(&mut state).unwrap();
        assert_eq!(state.buttons, Buttons::MB2 | Buttons::LF1);
    }

    #[test]
    fn test_pin_error_keeps_previous_state() {
        let mut rig = rig();
        rig.a.low.set(true);
        let mut state = InputState::neutral();
        rig.input.update_inputs(&mut state).unwrap();

        rig.b.fail.set(true);
        rig.time.set(10_000);
        rig.a.low.set(false);
        assert_eq!(rig.input.update_inputs(&mut state), Err(InputError::Io));
        assert_eq!(state.buttons, Buttons::RT2);
    }
}
