//! Motion configuration types

/// Longest step pulse the control loop will busy-wait for
pub const MAX_PULSE_WIDTH_US: u32 = 10;

/// How the steps-per-second factor is derived from pulses per revolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepRatio {
    /// `pulses_per_rev / time_base` as a real number
    #[default]
    Exact,
    /// Integer-divided ratio (400 / 60 = 6)
    ///
    /// Matches pumps calibrated against older firmware. Delivers a lower
    /// flow than requested.
    Truncated,
}

/// What SET_STATE(RUNNING) does when no valid period can be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidPeriodPolicy {
    /// Reply ERROR and stay stopped
    #[default]
    Reject,
    /// Reply OK, report running, but emit no pulses
    Hold,
}

/// Stepper and lead screw parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperSettings {
    /// Step pulses per motor revolution (microsteps included)
    pub pulses_per_rev: u16,
    /// Plunger travel per revolution in mm
    pub mm_per_rev: f32,
    /// Seconds per rate unit (60 for per-minute rates)
    pub time_base_s: u16,
    /// Step pulse high time
    pub pulse_width_us: u32,
    pub ratio: StepRatio,
}

impl Default for StepperSettings {
    fn default() -> Self {
        Self {
            pulses_per_rev: 400,
            mm_per_rev: 0.7,
            time_base_s: 60,
            pulse_width_us: 5,
            ratio: StepRatio::Exact,
        }
    }
}

impl StepperSettings {
    /// Pulses per revolution divided by the time base
    ///
    /// Returns 0.0 for a zero time base; callers validate that first.
    pub fn steps_per_unit_time(&self) -> f32 {
        if self.time_base_s == 0 {
            return 0.0;
        }
        match self.ratio {
            StepRatio::Exact => self.pulses_per_rev as f32 / self.time_base_s as f32,
            StepRatio::Truncated => (self.pulses_per_rev / self.time_base_s) as f32,
        }
    }
}

/// Behaviour that differs between pump board revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// SET_DIRECTION is honoured and drives the direction output
    pub direction_control: bool,
    /// SET_STATE(RUNNING) recomputes the period from the pump model
    pub recompute_period_on_start: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            direction_control: true,
            recompute_period_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ratio() {
        let exact = StepperSettings::default();
        assert!((exact.steps_per_unit_time() - 400.0 / 60.0).abs() < 1e-6);

        let truncated = StepperSettings {
            ratio: StepRatio::Truncated,
            ..exact
        };
        assert_eq!(truncated.steps_per_unit_time(), 6.0);
    }

    #[test]
    fn test_zero_time_base() {
        let settings = StepperSettings {
            time_base_s: 0,
            ..StepperSettings::default()
        };
        assert_eq!(settings.steps_per_unit_time(), 0.0);
    }
}
