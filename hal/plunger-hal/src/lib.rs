//! Plunger Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The pump logic and the stepper driver only ever
//! talk to these traits, so they run unchanged on the host in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (plunger-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  plunger-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ plunger-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (step, direction, enable)
//! - [`serial::SerialRx`], [`serial::SerialTx`] - Host link
//! - [`time::MonotonicClock`], [`time::BusyWait`] - Pulse timing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[cfg(feature = "embedded-hal")]
pub mod adapter;
pub mod gpio;
pub mod serial;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use serial::{SerialConfig, SerialRx, SerialTx};
pub use time::{BusyWait, MonotonicClock};
