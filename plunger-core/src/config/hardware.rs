//! Hardware configuration types
//!
//! Pin assignments and serial link settings.

/// Highest user GPIO number on the RP2040
pub const MAX_GPIO: u8 = 29;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Stepper driver wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperPins {
    /// Step pulse pin
    pub step: PinConfig,
    /// Direction pin
    pub dir: PinConfig,
    /// Enable pin (active-low on A4988/DRV8825 style drivers)
    pub enable: PinConfig,
}

impl Default for StepperPins {
    fn default() -> Self {
        Self {
            step: PinConfig::new(9),
            dir: PinConfig::new(8),
            enable: PinConfig::inverted(10),
        }
    }
}

impl StepperPins {
    /// Pins as an array, for duplicate and range checks
    pub fn all(&self) -> [PinConfig; 3] {
        [self.step, self.dir, self.enable]
    }
}

/// Host serial link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialSettings {
    /// Baud rate (8N1)
    pub baud_rate: u32,
    /// Drop a partial frame after this long without a byte (0 = never)
    pub frame_timeout_ms: u32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            frame_timeout_ms: 1000,
        }
    }
}

impl SerialSettings {
    /// Frame timeout in microseconds, if enabled
    pub fn frame_timeout_us(&self) -> Option<u32> {
        match self.frame_timeout_ms {
            0 => None,
            ms => Some(ms.saturating_mul(1000)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins() {
        let pins = StepperPins::default();
        assert_eq!(pins.step.pin, 9);
        assert_eq!(pins.dir.pin, 8);
        assert_eq!(pins.enable.pin, 10);
        assert!(pins.enable.inverted);
    }

    #[test]
    fn test_frame_timeout() {
        let serial = SerialSettings::default();
        assert_eq!(serial.frame_timeout_us(), Some(1_000_000));

        let disabled = SerialSettings {
            frame_timeout_ms: 0,
            ..serial
        };
        assert_eq!(disabled.frame_timeout_us(), None);
    }
}
