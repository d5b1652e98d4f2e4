//! Time sources backed by the embassy time driver

use embassy_time::{Delay, Instant};
use plunger_hal::adapter::HalDelay;
use plunger_hal::MonotonicClock;

/// Microsecond clock on the RP2040 timer peripheral
///
/// The timer is 64-bit; the low 32 bits are returned and callers compare
/// with wrapping arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}

/// Busy-wait delay for step pulses
pub type PulseDelay = HalDelay<Delay>;

/// Create the pulse delay
pub fn pulse_delay() -> PulseDelay {
    HalDelay(Delay)
}
