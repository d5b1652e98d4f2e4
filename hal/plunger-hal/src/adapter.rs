//! Adapters from `embedded-hal` 1.0 to the Plunger traits
//!
//! Chip HALs such as embassy-rp already implement `embedded-hal`; wrapping
//! their pins and delays here avoids one glue impl per chip.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin as HalOutputPin;

use crate::gpio::OutputPin;
use crate::time::BusyWait;

/// Wraps an infallible `embedded-hal` output pin
///
/// The driven level is cached because `embedded-hal` only reports it
/// through `&mut self`.
pub struct HalPin<P> {
    pin: P,
    high: bool,
}

impl<P> HalPin<P>
where
    P: HalOutputPin<Error = Infallible>,
{
    /// Wrap a pin and drive it to `initial_high`
    pub fn new(mut pin: P, initial_high: bool) -> Self {
        let Ok(()) = if initial_high {
            pin.set_high()
        } else {
            pin.set_low()
        };
        Self {
            pin,
            high: initial_high,
        }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for HalPin<P>
where
    P: HalOutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        let Ok(()) = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let Ok(()) = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Wraps an `embedded-hal` delay provider
pub struct HalDelay<D>(pub D);

impl<D: DelayNs> BusyWait for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }
}
