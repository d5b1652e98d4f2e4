//! Build script for plunger-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates pump.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest step pulse the firmware will busy-wait for
const MAX_PULSE_WIDTH_US: i64 = 10;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate pump.toml configuration at compile time
fn validate_config() {
    // Re-run if pump.toml changes
    println!("cargo:rerun-if-changed=pump.toml");

    let config_path = Path::new("pump.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: pump.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a pump.toml configuration file.           ║\n\
            ║  Please create one in the plunger-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read pump.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in pump.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_device(&config, &mut errors);
    validate_serial(&config, &mut errors);
    validate_stepper(&config, &mut errors);
    validate_pump(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid pump configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=pump.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [(&str, &[&str]); 4] = [
    ("device", &["id", "revision"]),
    ("serial", &["baud_rate", "frame_timeout_ms"]),
    (
        "stepper",
        &[
            "step_pin",
            "dir_pin",
            "enable_pin",
            "pulses_per_rev",
            "mm_per_rev",
            "time_base_s",
            "pulse_width_us",
            "step_ratio",
        ],
    ),
    (
        "pump",
        &[
            "direction_control",
            "recompute_period_on_start",
            "invalid_period",
            "initial_period_us",
        ],
    ),
];

/// Reject unknown sections and keys; the firmware parser does too
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(section, _)| *section == name.as_str()) else {
            errors.push(format!("Unknown section [{}]", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    config.get(name).and_then(|s| s.as_table())
}

fn check_int(
    table: &toml::Table,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if range.contains(v) => {}
        Some(toml::Value::Integer(_)) => errors.push(format!(
            "[{}] {} must be {}-{}",
            section,
            key,
            range.start(),
            range.end()
        )),
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => {}
    }
}

fn check_bool(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(value) = table.get(key) {
        if !value.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

fn check_choice(
    table: &toml::Table,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        Some(toml::Value::String(s)) if choices.contains(&s.as_str()) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be one of: {}",
            section,
            key,
            choices.join(", ")
        )),
        None => {}
    }
}

fn validate_device(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(device) = section(config, "device") else {
        return;
    };
    check_int(device, "device", "id", 0..=255, errors);
    check_int(device, "device", "revision", 1..=2, errors);
}

fn validate_serial(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(serial) = section(config, "serial") else {
        return;
    };
    check_int(serial, "serial", "baud_rate", 1200..=921_600, errors);
    check_int(serial, "serial", "frame_timeout_ms", 0..=60_000, errors);
}

fn validate_stepper(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(stepper) = section(config, "stepper") else {
        return;
    };

    let mut pins = Vec::new();
    for key in ["step_pin", "dir_pin", "enable_pin"] {
        match stepper.get(key) {
            Some(toml::Value::String(s)) => match parse_pin(s) {
                Some(pin) if pin < 2 => {
                    errors.push(format!("[stepper] {} gpio{} is the host UART", key, pin))
                }
                Some(pin) if pins.contains(&pin) => {
                    errors.push(format!("[stepper] {} reuses gpio{}", key, pin))
                }
                Some(pin) => pins.push(pin),
                None => errors.push(format!("[stepper] {} must look like \"gpio9\"", key)),
            },
            Some(_) => errors.push(format!("[stepper] {} must be a string", key)),
            None => {}
        }
    }

    check_int(stepper, "stepper", "pulses_per_rev", 1..=u16::MAX as i64, errors);
    check_int(stepper, "stepper", "time_base_s", 1..=u16::MAX as i64, errors);
    check_int(
        stepper,
        "stepper",
        "pulse_width_us",
        1..=MAX_PULSE_WIDTH_US,
        errors,
    );
    check_choice(stepper, "stepper", "step_ratio", &["exact", "truncated"], errors);

    match stepper.get("mm_per_rev") {
        Some(toml::Value::Float(v)) if *v > 0.0 && v.is_finite() => {}
        Some(toml::Value::Integer(v)) if *v > 0 => {}
        Some(_) => errors.push("[stepper] mm_per_rev must be a positive number".to_string()),
        None => {}
    }
}

fn validate_pump(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pump) = section(config, "pump") else {
        return;
    };
    check_bool(pump, "pump", "direction_control", errors);
    check_bool(pump, "pump", "recompute_period_on_start", errors);
    check_choice(pump, "pump", "invalid_period", &["reject", "hold"], errors);
    check_int(pump, "pump", "initial_period_us", 0..=u32::MAX as i64, errors);
}

/// Parse "gpio9" / "!gpio10" into the GPIO number
fn parse_pin(value: &str) -> Option<u8> {
    let s = value.strip_prefix('!').unwrap_or(value);
    let pin: u8 = s.strip_prefix("gpio")?.parse().ok()?;
    (pin <= 29).then_some(pin)
}
