//! RP2040-specific HAL for the syringe pump firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `plunger-hal` traits, plus RP2040-specific functionality:
//!
//! - GPIO allocation by number for config-driven pin assignment
//! - Buffered UART host link
//! - Microsecond clock on the embassy time driver

#![no_std]

pub mod pins;
pub mod serial;
pub mod time;

// Re-export shared traits from plunger-hal for convenience
pub use plunger_hal::{BusyWait, MonotonicClock, OutputPin, SerialRx, SerialTx};
