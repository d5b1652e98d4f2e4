//! Board-agnostic core logic for the syringe pump firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Step output trait implemented by stepper drivers
//! - Pump model (syringe geometry, flow rate, step period)
//! - Command dispatcher mapping frames to state changes and replies
//! - Step clock deciding when to pulse
//! - Control loop tying the above to a byte stream and a clock
//! - Configuration record with the revision presets

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod dispatch;
pub mod pump;
pub mod step_clock;
pub mod traits;

pub use config::PumpConfig;
pub use control::ControlLoop;
pub use dispatch::{DispatchError, Dispatcher};
pub use pump::{compute_period, Period, PeriodError, PumpState, Syringe};
pub use step_clock::StepClock;
pub use traits::StepOutput;
