//! Status LED and bootloader entry.

use controller_core::BootPlatform;
use defmt::info;
use embassy_rp::gpio::Output;

/// Cycles between LED toggles while halted (about 100 ms at 125 MHz).
const HALT_BLINK_CYCLES: u32 = 12_500_000;

pub struct RpPlatform {
    led: Output<'static>,
}

impl RpPlatform {
    #[must_use]
    pub fn new(led: Output<'static>) -> Self {
        Self { led }
    }

    /// Stop after a fatal boot error, blinking the LED forever.
    pub fn halt(&mut self) -> ! {
        loop {
            self.led.toggle();
            cortex_m::asm::delay(HALT_BLINK_CYCLES);
        }
    }
}

impl BootPlatform for RpPlatform {
    fn enter_bootloader(&mut self) -> ! {
        info!("Rebooting into USB bootloader");
        embassy_rp::rom_data::reset_to_usb_boot(0, 0);
        loop {
            cortex_m::asm::nop();
        }
    }

    fn indicate_booted(&mut self) {
        self.led.set_high();
    }
}
