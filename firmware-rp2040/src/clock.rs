//! Embassy time driver as the debounce clock.

use controller_core::Clock;
use embassy_time::Instant;

/// Microseconds since boot from the embassy time driver.
///
/// The RP2040 timer is a single peripheral counter, so both cores read the
/// same time base.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_micros(&self) -> u64 {
        Instant::now().as_micros()
    }
}
