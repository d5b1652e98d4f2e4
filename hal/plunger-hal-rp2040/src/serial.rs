//! Buffered UART host link
//!
//! Wraps embassy-rp's interrupt-driven `BufferedUart`. Receive never
//! blocks: `ReadReady` is checked before every read.

use embassy_rp::uart::{self, BufferedUart};
use embedded_io::{Read, ReadReady, Write};
use plunger_hal::serial::{DataBits, Parity, SerialConfig, StopBits};
use plunger_hal::{SerialRx, SerialTx};

/// Convert a line configuration to the embassy-rp UART config
pub fn uart_config(config: &SerialConfig) -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

/// Host serial port on a buffered UART
pub struct RpSerial {
    uart: BufferedUart,
}

impl RpSerial {
    pub fn new(uart: BufferedUart) -> Self {
        Self { uart }
    }
}

impl SerialRx for RpSerial {
    type Error = uart::Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.uart.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl SerialTx for RpSerial {
    type Error = uart::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Write::write_all(&mut self.uart, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.uart)
    }
}
