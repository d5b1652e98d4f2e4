//! GPIO pin abstractions
//!
//! The pump only drives outputs: step, direction and driver enable.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

impl<P: OutputPin + ?Sized> OutputPin for &mut P {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}

/// Output pin with configurable polarity
///
/// `set_active(true)` drives the pin low when the pin is inverted
/// (active-low enable inputs, for example).
pub struct PolarizedPin<P> {
    pin: P,
    inverted: bool,
}

impl<P: OutputPin> PolarizedPin<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Drive the logical level
    pub fn set_active(&mut self, active: bool) {
        self.pin.set_state(active != self.inverted);
    }

    /// Logical level currently driven
    pub fn is_active(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}
