//! Configuration types
//!
//! Board-agnostic configuration for the pump. The firmware fills a
//! [`PumpConfig`] from its embedded TOML file; everything else in this crate
//! reads it.

pub mod hardware;
pub mod pump;
pub mod types;

pub use hardware::*;
pub use pump::*;
pub use types::*;
