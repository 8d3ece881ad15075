//! Build-time wiring of the pico adapter board.
//!
//! | Function        | GPIO |
//! |-----------------|------|
//! | Buttons         | see [`BUTTON_MAPPINGS`] |
//! | Joybus data     | 28   |
//! | Report UART TX  | 8    |
//! | Status LED      | 25   |

use controller_core::{
    board_is_consistent, Buttons, DebouncedButtonInput, GpioButtonMapping, Pinout,
};
use defmt::debug_assert_eq;
use embassy_rp::gpio::{AnyPin, Input, Pin, Pull};
use embassy_rp::Peri;

use crate::clock::EmbassyClock;

pub const BUTTON_COUNT: usize = 23;

/// Button held at power-on to enter the USB bootloader.
pub const MAINTENANCE_COMBO: Buttons = Buttons::RT2;

pub const BUTTON_MAPPINGS: [GpioButtonMapping; BUTTON_COUNT] = [
    GpioButtonMapping::new(Buttons::LF1, 2),
    GpioButtonMapping::new(Buttons::LF2, 3),
    GpioButtonMapping::new(Buttons::LF3, 4),
    GpioButtonMapping::new(Buttons::LF4, 5),
    GpioButtonMapping::new(Buttons::LF5, 1),
    GpioButtonMapping::new(Buttons::LT1, 6),
    GpioButtonMapping::new(Buttons::LT2, 7),
    GpioButtonMapping::new(Buttons::MB1, 0),
    GpioButtonMapping::new(Buttons::MB2, 10),
    GpioButtonMapping::new(Buttons::MB3, 11),
    GpioButtonMapping::new(Buttons::RT1, 14),
    GpioButtonMapping::new(Buttons::RT2, 15),
    GpioButtonMapping::new(Buttons::RT3, 13),
    GpioButtonMapping::new(Buttons::RT4, 12),
    GpioButtonMapping::new(Buttons::RT5, 16),
    GpioButtonMapping::new(Buttons::RF1, 26),
    GpioButtonMapping::new(Buttons::RF2, 21),
    GpioButtonMapping::new(Buttons::RF3, 19),
    GpioButtonMapping::new(Buttons::RF4, 17),
    GpioButtonMapping::new(Buttons::RF5, 27),
    GpioButtonMapping::new(Buttons::RF6, 22),
    GpioButtonMapping::new(Buttons::RF7, 20),
    GpioButtonMapping::new(Buttons::RF8, 18),
];

pub const PINOUT: Pinout = Pinout {
    joybus_data: Some(28),
    report_uart_tx: Some(8),
    ..Pinout::UNUSED
};

/// GPIO of the on-board LED.
pub const LED_PIN: u8 = 25;

const _: () = assert!(
    board_is_consistent(&BUTTON_MAPPINGS, &PINOUT),
    "button table and pinout overlap or are invalid"
);

// `main` hands PIN_8 to UART1 TX.
const _: () = assert!(matches!(PINOUT.report_uart_tx, Some(8)));

const _: () = {
    let mut i = 0;
    while i < BUTTON_COUNT {
        assert!(BUTTON_MAPPINGS[i].pin != LED_PIN, "LED pin used by a button");
        i += 1;
    }
};

pub type ButtonInput = DebouncedButtonInput<Input<'static>, EmbassyClock, BUTTON_COUNT>;

/// Debounced input over the button pins, with pull-ups.
///
/// `pins[i]` must be the GPIO of `BUTTON_MAPPINGS[i]`.
pub fn button_input(pins: [Peri<'static, AnyPin>; BUTTON_COUNT]) -> ButtonInput {
    let mut i = 0;
    let pins = pins.map(|pin| {
        let mapping = BUTTON_MAPPINGS[i];
        i += 1;
        debug_assert_eq!(pin.pin(), mapping.pin, "button pin out of table order");
        (mapping.button, Input::new(pin, Pull::Up))
    });
    DebouncedButtonInput::new(pins, EmbassyClock)
}
