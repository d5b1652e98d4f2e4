//! Top-level pump configuration record

use super::hardware::{SerialSettings, StepperPins, MAX_GPIO};
use super::types::{Capabilities, InvalidPeriodPolicy, StepperSettings, MAX_PULSE_WIDTH_US};

/// Errors found by [`PumpConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pulse width is zero
    ZeroPulseWidth,
    /// Pulse width exceeds [`MAX_PULSE_WIDTH_US`]
    PulseWidthTooLong(u32),
    ZeroPulsesPerRev,
    /// mm per revolution is not a positive finite number
    InvalidMmPerRev,
    ZeroTimeBase,
    ZeroBaudRate,
    /// Initial period of zero microseconds
    ZeroInitialPeriod,
    /// GPIO number above [`MAX_GPIO`]
    PinOutOfRange(u8),
    /// Same GPIO assigned twice
    DuplicatePin(u8),
}

/// Complete pump configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpConfig {
    /// Reported by GET_DEVICE_NUMBER
    pub device_id: u8,
    pub stepper: StepperSettings,
    pub pins: StepperPins,
    pub serial: SerialSettings,
    pub capabilities: Capabilities,
    pub period_policy: InvalidPeriodPolicy,
    /// Period in effect before any is computed
    pub initial_period_us: Option<u32>,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self::revision2()
    }
}

impl PumpConfig {
    /// First board revision
    ///
    /// 8 us pulses at a fixed 1000 us period; SET_STATE only starts and
    /// stops the motor and there is no direction control.
    pub fn revision1() -> Self {
        Self {
            device_id: 0x01,
            stepper: StepperSettings {
                pulse_width_us: 8,
                ..StepperSettings::default()
            },
            pins: StepperPins::default(),
            serial: SerialSettings::default(),
            capabilities: Capabilities {
                direction_control: false,
                recompute_period_on_start: false,
            },
            period_policy: InvalidPeriodPolicy::Reject,
            initial_period_us: Some(1000),
        }
    }

    /// Second board revision
    ///
    /// 5 us pulses, SET_DIRECTION supported and the period recomputed from
    /// the syringe and rate on every start.
    pub fn revision2() -> Self {
        Self {
            device_id: 0x01,
            stepper: StepperSettings::default(),
            pins: StepperPins::default(),
            serial: SerialSettings::default(),
            capabilities: Capabilities::default(),
            period_policy: InvalidPeriodPolicy::Reject,
            initial_period_us: None,
        }
    }

    /// Check the configuration for values the firmware cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stepper = &self.stepper;
        if stepper.pulse_width_us == 0 {
            return Err(ConfigError::ZeroPulseWidth);
        }
        if stepper.pulse_width_us > MAX_PULSE_WIDTH_US {
            return Err(ConfigError::PulseWidthTooLong(stepper.pulse_width_us));
        }
        if stepper.pulses_per_rev == 0 {
            return Err(ConfigError::ZeroPulsesPerRev);
        }
        if !(stepper.mm_per_rev > 0.0 && stepper.mm_per_rev.is_finite()) {
            return Err(ConfigError::InvalidMmPerRev);
        }
        if stepper.time_base_s == 0 {
            return Err(ConfigError::ZeroTimeBase);
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }
        if self.initial_period_us == Some(0) {
            return Err(ConfigError::ZeroInitialPeriod);
        }

        let pins = self.pins.all();
        for (i, pin) in pins.iter().enumerate() {
            if pin.pin > MAX_GPIO {
                return Err(ConfigError::PinOutOfRange(pin.pin));
            }
            if pins[..i].iter().any(|other| other.pin == pin.pin) {
                return Err(ConfigError::DuplicatePin(pin.pin));
            }
        }

        Ok(())
    }
}
