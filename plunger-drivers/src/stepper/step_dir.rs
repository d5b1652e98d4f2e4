//! Step/direction stepper driver
//!
//! Drives any driver chip with STEP, DIR and EN inputs. The step pulse is
//! a busy-wait: the high phase is a few microseconds and must not be
//! stretched by the executor.

use plunger_core::config::StepperPins;
use plunger_core::traits::{Direction, StepOutput};
use plunger_hal::gpio::{OutputPin, PolarizedPin};
use plunger_hal::time::BusyWait;

/// STEP/DIR/EN stepper driver
///
/// Direction `Forward` drives DIR low and `Reverse` drives it high (before
/// inversion). The enable pin is typically active-low.
pub struct StepDirDriver<S, D, E, W> {
    step: PolarizedPin<S>,
    dir: PolarizedPin<D>,
    enable: PolarizedPin<E>,
    delay: W,
    direction: Direction,
    enabled: bool,
}

impl<S, D, E, W> StepDirDriver<S, D, E, W>
where
    S: OutputPin,
    D: OutputPin,
    E: OutputPin,
    W: BusyWait,
{
    /// Create a driver; outputs start idle with the driver disabled
    ///
    /// Polarity of each pin comes from `pins`; the GPIO numbers are only
    /// used by the firmware to pick the peripherals.
    pub fn new(step: S, dir: D, enable: E, delay: W, pins: &StepperPins) -> Self {
        let mut driver = Self {
            step: PolarizedPin::new(step, pins.step.inverted),
            dir: PolarizedPin::new(dir, pins.dir.inverted),
            enable: PolarizedPin::new(enable, pins.enable.inverted),
            delay,
            direction: Direction::Forward,
            enabled: false,
        };
        driver.step.set_active(false);
        driver.dir.set_active(false);
        driver.enable.set_active(false);
        driver
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<S, D, E, W> StepOutput for StepDirDriver<S, D, E, W>
where
    S: OutputPin,
    D: OutputPin,
    E: OutputPin,
    W: BusyWait,
{
    fn pulse(&mut self, width_us: u32) {
        self.step.set_active(true);
        self.delay.delay_us(width_us);
        self.step.set_active(false);
    }

    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.dir.set_active(direction == Direction::Reverse);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.enable.set_active(enabled);
    }
}
