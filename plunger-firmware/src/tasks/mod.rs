//! Embassy async tasks
//!
//! The pump runs as a single cooperative task; see [`pump`].

pub mod pump;

pub use pump::{pump_task, PumpDriver};
