//! Pump model
//!
//! Syringe geometry, flow rate and the step period derived from them.
//!
//! The period is the time between step pulses:
//!
//! ```text
//! period_us = 1e6 / (rate * (length_mm / volume_ml) / mm_per_rev * steps_per_unit_time)
//! ```
//!
//! `length_mm / volume_ml` converts volume to plunger travel, dividing by
//! `mm_per_rev` gives motor revolutions and `steps_per_unit_time` turns
//! revolutions per rate unit into pulses per second.

use crate::config::StepperSettings;
use crate::traits::{Direction, RunState};

/// Syringe barrel geometry
///
/// Values are stored as received; they are only checked when a period is
/// computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Syringe {
    pub volume_ml: f32,
    pub length_mm: f32,
}

/// Time between step pulses in microseconds, always nonzero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Period(u32);

impl Period {
    /// Create a period, rejecting zero
    pub const fn from_us(us: u32) -> Option<Self> {
        if us == 0 {
            None
        } else {
            Some(Self(us))
        }
    }

    pub const fn as_us(self) -> u32 {
        self.0
    }
}

/// Why no step period could be derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeriodError {
    /// Rate is zero, negative or not finite
    InvalidRate,
    /// Syringe volume is zero, negative or not finite
    InvalidVolume,
    /// Syringe length is zero, negative or not finite
    InvalidLength,
    /// Stepper calibration yields no steps
    InvalidCalibration,
    /// Result does not fit 1..=u32::MAX microseconds
    OutOfRange,
}

fn is_positive(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}

/// Compute the step period for a syringe and rate
pub fn compute_period(
    syringe: &Syringe,
    rate: f32,
    stepper: &StepperSettings,
) -> Result<Period, PeriodError> {
    if !is_positive(rate) {
        return Err(PeriodError::InvalidRate);
    }
    if !is_positive(syringe.volume_ml) {
        return Err(PeriodError::InvalidVolume);
    }
    if !is_positive(syringe.length_mm) {
        return Err(PeriodError::InvalidLength);
    }
    let steps_per_unit_time = stepper.steps_per_unit_time();
    if !is_positive(stepper.mm_per_rev) || !is_positive(steps_per_unit_time) {
        return Err(PeriodError::InvalidCalibration);
    }

    let mm_per_ml = syringe.length_mm / syringe.volume_ml;
    let steps_per_second = rate * mm_per_ml / stepper.mm_per_rev * steps_per_unit_time;
    let period_us = 1_000_000.0 / steps_per_second;

    // NaN fails both comparisons
    if !(period_us >= 0.5 && period_us < u32::MAX as f32) {
        return Err(PeriodError::OutOfRange);
    }

    // No f32::round in core; the value is positive so this rounds half up
    let rounded = (period_us + 0.5) as u32;
    Period::from_us(rounded).ok_or(PeriodError::OutOfRange)
}

/// Everything the host can change
///
/// Created once at startup, owned by the control loop and mutated only by
/// the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpState {
    pub syringe: Syringe,
    pub rate: f32,
    pub run_state: RunState,
    pub direction: Direction,
    /// Period the step clock runs at; `None` means no pulses
    pub period: Option<Period>,
}

impl Default for PumpState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PumpState {
    /// Zeroed geometry, stopped, forward
    pub fn new(initial_period: Option<Period>) -> Self {
        Self {
            syringe: Syringe::default(),
            rate: 0.0,
            run_state: RunState::Stopped,
            direction: Direction::Forward,
            period: initial_period,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Recompute the period from the current geometry and rate
    ///
    /// On failure the period is cleared so a stale value is never used.
    pub fn recompute_period(&mut self, stepper: &StepperSettings) -> Result<Period, PeriodError> {
        let result = compute_period(&self.syringe, self.rate, stepper);
        self.period = result.ok();
        result
    }
}
