//! Simple TOML parser for the pump configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! pump.toml. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays, inline tables, multi-line strings
//! - Dotted keys and nested sections
//!
//! `revision` in `[device]` picks the preset the other keys are applied
//! on top of, wherever it appears in the file.

use plunger_core::config::{
    ConfigError, InvalidPeriodPolicy, PinConfig, PumpConfig, StepRatio,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Revision other than 1 or 2
    UnknownRevision(u8),
    /// File parsed but the result is unusable
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Config(err)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Serial,
    Stepper,
    Pump,
}

/// Parse TOML configuration into a validated PumpConfig
pub fn parse_config(input: &str) -> Result<PumpConfig, ParseError> {
    let mut config = match find_revision(input)? {
        None | Some(2) => PumpConfig::revision2(),
        Some(1) => PumpConfig::revision1(),
        Some(other) => return Err(ParseError::UnknownRevision(other)),
    };

    let mut section = Section::Root;
    for line in content_lines(input) {
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

/// Non-empty, non-comment lines, trimmed
fn content_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// First pass: the preset has to be known before any override is applied
fn find_revision(input: &str) -> Result<Option<u8>, ParseError> {
    let mut section = Section::Root;
    for line in content_lines(input) {
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = parse_section_header(header)?;
            continue;
        }
        if section == Section::Device {
            if let Some(("revision", value)) = parse_key_value(line) {
                return parse_int(value).map(Some);
            }
        }
    }
    Ok(None)
}

/// Parse section header like "stepper"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "device" => Ok(Section::Device),
        "serial" => Ok(Section::Serial),
        "stepper" => Ok(Section::Stepper),
        "pump" => Ok(Section::Pump),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin string like "gpio9" or "!gpio10"
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let value = parse_string(value);
    let (inverted, s) = match value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let pin: u8 = s
        .strip_prefix("gpio")
        .ok_or(ParseError::InvalidPin)?
        .parse()
        .map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig { pin, inverted })
}

fn parse_step_ratio(value: &str) -> Result<StepRatio, ParseError> {
    match parse_string(value) {
        "exact" => Ok(StepRatio::Exact),
        "truncated" => Ok(StepRatio::Truncated),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_period_policy(value: &str) -> Result<InvalidPeriodPolicy, ParseError> {
    match parse_string(value) {
        "reject" => Ok(InvalidPeriodPolicy::Reject),
        "hold" => Ok(InvalidPeriodPolicy::Hold),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply one key to the config
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut PumpConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Device, "id") => config.device_id = parse_int(value)?,
        // Applied before the second pass
        (Section::Device, "revision") => {}

        (Section::Serial, "baud_rate") => config.serial.baud_rate = parse_int(value)?,
        (Section::Serial, "frame_timeout_ms") => {
            config.serial.frame_timeout_ms = parse_int(value)?
        }

        (Section::Stepper, "step_pin") => config.pins.step = parse_pin(value)?,
        (Section::Stepper, "dir_pin") => config.pins.dir = parse_pin(value)?,
        (Section::Stepper, "enable_pin") => config.pins.enable = parse_pin(value)?,
        (Section::Stepper, "pulses_per_rev") => {
            config.stepper.pulses_per_rev = parse_int(value)?
        }
        (Section::Stepper, "mm_per_rev") => config.stepper.mm_per_rev = parse_float(value)?,
        (Section::Stepper, "time_base_s") => config.stepper.time_base_s = parse_int(value)?,
        (Section::Stepper, "pulse_width_us") => {
            config.stepper.pulse_width_us = parse_int(value)?
        }
        (Section::Stepper, "step_ratio") => config.stepper.ratio = parse_step_ratio(value)?,

        (Section::Pump, "direction_control") => {
            config.capabilities.direction_control = parse_bool(value)?
        }
        (Section::Pump, "recompute_period_on_start") => {
            config.capabilities.recompute_period_on_start = parse_bool(value)?
        }
        (Section::Pump, "invalid_period") => config.period_policy = parse_period_policy(value)?,
        (Section::Pump, "initial_period_us") => {
            let us: u32 = parse_int(value)?;
            config.initial_period_us = (us != 0).then_some(us);
        }

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
