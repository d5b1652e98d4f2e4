//! Configuration loading and parsing
//!
//! The configuration is compiled in from pump.toml and parsed at boot by a
//! small no_std parser. build.rs has already checked the file, so a parse
//! failure here means the two disagree.

pub mod toml;

use defmt::*;
use plunger_core::PumpConfig;

pub use toml::{parse_config, ParseError};

/// Parse the embedded configuration, falling back to the defaults
pub fn load_config(source: &str) -> PumpConfig {
    match parse_config(source) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using revision 2 defaults");
            PumpConfig::default()
        }
    }
}
