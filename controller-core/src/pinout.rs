//! Build-time pin assignment tables.

use crate::types::Buttons;

/// Highest GPIO number on the target (RP2040 has GPIO 0-29).
pub const MAX_GPIO: u8 = 29;

/// One entry of the button-to-pin table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioButtonMapping {
    /// Logical button (a single bit).
    pub button: Buttons,
    /// GPIO number the button is wired to.
    pub pin: u8,
}

impl GpioButtonMapping {
    #[must_use]
    pub const fn new(button: Buttons, pin: u8) -> Self {
        Self { button, pin }
    }
}

/// Pins of every peripheral class other than the digital buttons.
///
/// `None` means the board does not wire that peripheral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pinout {
    pub joybus_data: Option<u8>,
    pub nes_data: Option<u8>,
    pub nes_clock: Option<u8>,
    pub nes_latch: Option<u8>,
    pub mux: Option<u8>,
    pub nunchuk_detect: Option<u8>,
    pub nunchuk_sda: Option<u8>,
    pub nunchuk_scl: Option<u8>,
    pub report_uart_tx: Option<u8>,
}

impl Pinout {
    /// Number of pin slots in a pinout.
    pub const SLOTS: usize = 9;

    /// All pin slots in declaration order.
    #[must_use]
    pub const fn pins(&self) -> [Option<u8>; Self::SLOTS] {
        [
            self.joybus_data,
            self.nes_data,
            self.nes_clock,
            self.nes_latch,
            self.mux,
            self.nunchuk_detect,
            self.nunchuk_sda,
            self.nunchuk_scl,
            self.report_uart_tx,
        ]
    }
}

/// Check a board's tables at compile time.
///
/// Returns `true` when every button is a single distinct bit, every pin is a
/// valid GPIO, and no GPIO is claimed twice across buttons and peripherals.
///
/// ```
/// use controller_core::{board_is_consistent, Buttons, GpioButtonMapping, Pinout};
///
/// const MAPPINGS: [GpioButtonMapping; 2] = [
///     GpioButtonMapping::new(Buttons::LF1, 2),
///     GpioButtonMapping::new(Buttons::LF2, 3),
/// ];
/// const PINOUT: Pinout = Pinout { joybus_data: Some(28), ..Pinout::UNUSED };
/// const _: () = assert!(board_is_consistent(&MAPPINGS, &PINOUT));
/// ```
#[must_use]
pub const fn board_is_consistent(mappings: &[GpioButtonMapping], pinout: &Pinout) -> bool {
    let mut used: u32 = 0;
    let mut buttons: u32 = 0;

    let mut i = 0;
    while i < mappings.len() {
        let m = mappings[i];
        if m.pin > MAX_GPIO || m.button.0.count_ones() != 1 {
            return false;
        }
        if used & (1 << m.pin) != 0 || buttons & m.button.0 != 0 {
            return false;
        }
        used |= 1 << m.pin;
        buttons |= m.button.0;
        i += 1;
    }

    let slots = pinout.pins();
    let mut j = 0;
    while j < slots.len() {
        if let Some(pin) = slots[j] {
            if pin > MAX_GPIO || used & (1 << pin) != 0 {
                return false;
            }
            used |= 1 << pin;
        }
        j += 1;
    }
    true
}

impl Pinout {
    /// A pinout with no peripherals wired.
    pub const UNUSED: Self = Self {
        joybus_data: None,
        nes_data: None,
        nes_clock: None,
        nes_latch: None,
        mux: None,
        nunchuk_detect: None,
        nunchuk_sda: None,
        nunchuk_scl: None,
        report_uart_tx: None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: [GpioButtonMapping; 2] = [
        GpioButtonMapping::new(Buttons::LF1, 2),
        GpioButtonMapping::new(Buttons::LF2, 3),
    ];

    #[test]
    fn test_consistent_board() {
        let pinout = Pinout {
            joybus_data: Some(28),
            report_uart_tx: Some(8),
            ..Pinout::UNUSED
        };
        assert!(board_is_consistent(&TWO, &pinout));
    }

    #[test]
    fn test_duplicate_button_pin_rejected() {
        let mappings = [
            GpioButtonMapping::new(Buttons::LF1, 2),
            GpioButtonMapping::new(Buttons::LF2, 2),
        ];
        assert!(!board_is_consistent(&mappings, &Pinout::UNUSED));
    }

    #[test]
    fn test_duplicate_button_rejected() {
        let mappings = [
            GpioButtonMapping::new(Buttons::LF1, 2),
            GpioButtonMapping::new(Buttons::LF1, 3),
        ];
        assert!(!board_is_consistent(&mappings, &Pinout::UNUSED));
    }

    #[test]
    fn test_multi_bit_button_rejected() {
        let mappings = [GpioButtonMapping::new(Buttons::LF1.union(Buttons::LF2), 2)];
        assert!(!board_is_consistent(&mappings, &Pinout::UNUSED));
    }

    #[test]
    fn test_peripheral_pin_clash_rejected() {
        let pinout = Pinout {
            joybus_data: Some(3),
            ..Pinout::UNUSED
        };
        assert!(!board_is_consistent(&TWO, &pinout));
    }

    #[test]
    fn test_out_of_range_pin_rejected() {
        let pinout = Pinout {
            mux: Some(30),
            ..Pinout::UNUSED
        };
        assert!(!board_is_consistent(&TWO, &pinout));
    }
}
