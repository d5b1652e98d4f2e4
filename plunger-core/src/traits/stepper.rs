//! Stepper output trait
//!
//! The pump only needs a step/direction style interface: one pulse per
//! microstep, a direction level and a driver enable.

pub use plunger_protocol::{Direction, RunState};

/// Trait for step/direction stepper drivers
pub trait StepOutput {
    /// Emit one step pulse
    ///
    /// Drives the step output high, holds it for `width_us` and drives it
    /// low again. Blocks for the high phase.
    fn pulse(&mut self, width_us: u32);

    /// Set the travel direction
    fn set_direction(&mut self, direction: Direction);

    /// Enable or disable the driver power stage
    fn set_enabled(&mut self, enabled: bool);
}

impl<T: StepOutput + ?Sized> StepOutput for &mut T {
    fn pulse(&mut self, width_us: u32) {
        (**self).pulse(width_us);
    }

    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction);
    }

    fn set_enabled(&mut self, enabled: bool) {
        (**self).set_enabled(enabled);
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// Records everything the core asks of the driver
    #[derive(Debug, Default)]
    pub struct RecordingOutput {
        pub pulses: heapless::Vec<u32, 64>,
        pub direction: Option<Direction>,
        pub direction_changes: u32,
        pub enabled: Option<bool>,
    }

    impl StepOutput for RecordingOutput {
        fn pulse(&mut self, width_us: u32) {
            let _ = self.pulses.push(width_us);
        }

        fn set_direction(&mut self, direction: Direction) {
            self.direction = Some(direction);
            self.direction_changes += 1;
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = Some(enabled);
        }
    }
}
