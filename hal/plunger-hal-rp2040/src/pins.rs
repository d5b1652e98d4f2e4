//! GPIO allocation by number
//!
//! Step, direction and enable pins come from the pump config file, so they
//! are handed out at runtime from a bank of type-erased pins. GPIO0 and
//! GPIO1 stay typed because UART0 needs them as TX/RX.

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for the host UART
    Reserved(u8),
}

/// Pin bank that allows taking GPIOs by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let slot = self
            .pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin(pin_num))?;
        if pin_num < 2 {
            return Err(PinError::Reserved(pin_num));
        }
        slot.take().ok_or(PinError::AlreadyTaken(pin_num))
    }

    /// Take a pin and configure it as a push-pull output
    pub fn take_output(&mut self, pin_num: u8, high: bool) -> Result<Output<'static>, PinError> {
        let level = if high { Level::High } else { Level::Low };
        Ok(Output::new(self.take(pin_num)?, level))
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        self.pins
            .get(pin_num as usize)
            .is_some_and(|slot| slot.is_some())
    }
}

/// Peripherals the firmware uses, split for ownership
pub struct BoardPeripherals {
    pub bank: PinBank,
    pub uart0: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
}

impl BoardPeripherals {
    /// Split embassy peripherals into the UART and the GPIO bank
    pub fn split(p: Peripherals) -> Self {
        let bank = PinBank {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        Self {
            bank,
            uart0: p.UART0,
            uart_tx: p.PIN_0,
            uart_rx: p.PIN_1,
        }
    }
}
