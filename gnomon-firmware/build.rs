//! Build script for gnomon-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use gnomon_core::config::{parse_config, OverrunPolicy};
use gnomon_core::pin::{parse_pin_string, PinRef};

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

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a machine.toml configuration file.        ║\n\
            ║  Please create one in the gnomon-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
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
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    report("timing", validate_timing(&config));
    report("stepper", validate_steppers(&config));
    report("clock", validate_clock(&config));

    // The firmware parses the same text at boot; reject anything it would
    // fall back on
    if let Err(e) = parse_config(&config_content) {
        report("machine", vec![format!("firmware parser rejected config: {:?}", e)]);
    }

    println!("cargo:warning=machine.toml validated successfully");
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

/// Abort the build if a section produced errors
fn report(section: &str, errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }
    let title = format!("ERROR: Invalid {} configuration", section);
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  {:<64} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate the [timing] section
fn validate_timing(config: &toml::Value) -> Vec<String> {
    let timing = match config.get("timing") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => return vec!["[timing] must be a table".to_string()],
        None => return Vec::new(),
    };

    let mut errors = Vec::new();

    for key in ["tick_budget_ms", "period_s", "steps_per_rev", "pulse_ms"] {
        match timing.get(key) {
            Some(toml::Value::Integer(v)) if *v < 0 || *v > u32::MAX as i64 => {
                errors.push(format!("[timing] {} out of range", key));
            }
            Some(toml::Value::Integer(_)) | None => {}
            Some(_) => errors.push(format!("[timing] {} must be an integer", key)),
        }
    }

    if let Some(toml::Value::Integer(0)) = timing.get("tick_budget_ms") {
        errors.push("[timing] tick_budget_ms must be non-zero".to_string());
    }
    if let Some(toml::Value::Integer(0)) = timing.get("steps_per_rev") {
        errors.push("[timing] steps_per_rev must be non-zero".to_string());
    }

    match timing.get("overrun") {
        Some(toml::Value::String(policy)) => {
            if OverrunPolicy::from_name(policy).is_none() {
                errors.push("[timing] overrun must be 'clamp' or 'carry'".to_string());
            }
        }
        Some(_) => errors.push("[timing] overrun must be a string".to_string()),
        None => {}
    }

    for key in timing.keys() {
        if ![
            "tick_budget_ms",
            "period_s",
            "steps_per_rev",
            "pulse_ms",
            "overrun",
        ]
        .contains(&key.as_str())
        {
            errors.push(format!("[timing] unknown key '{}'", key));
        }
    }

    errors
}

/// Validate the [stepper.*] sections
fn validate_steppers(config: &toml::Value) -> Vec<String> {
    let steppers = match config.get("stepper") {
        Some(toml::Value::Table(t)) => t,
        _ => return vec!["Missing [stepper.*] section - at least one stepper is required".to_string()],
    };

    let mut errors = Vec::new();
    let mut used: HashSet<PinRef> = HashSet::new();

    if steppers.len() > 4 {
        errors.push("At most 4 steppers are supported".to_string());
    }

    for (name, stepper) in steppers {
        let stepper = match stepper {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[stepper.{}] must be a table", name));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("[stepper.{}] name longer than 16 characters", name));
        }

        for coil in ["coil_a", "coil_b"] {
            match stepper.get(coil) {
                Some(toml::Value::Array(pins)) if pins.len() == 2 => {
                    for pin in pins {
                        match pin.as_str().map(parse_pin_string) {
                            Some(Ok(pin)) => {
                                if !used.insert(pin) {
                                    errors.push(format!(
                                        "[stepper.{}] pin {} is already in use",
                                        name, pin
                                    ));
                                }
                            }
                            _ => errors.push(format!(
                                "[stepper.{}] {} has an invalid pin (use \"PA0\"-\"PB7\")",
                                name, coil
                            )),
                        }
                    }
                }
                Some(_) => errors.push(format!(
                    "[stepper.{}] {} must be an array of two pins",
                    name, coil
                )),
                None => errors.push(format!("[stepper.{}] missing '{}'", name, coil)),
            }
        }

        if let Some(value) = stepper.get("release_when_idle") {
            if !value.is_bool() {
                errors.push(format!("[stepper.{}] release_when_idle must be a boolean", name));
            }
        }
    }

    errors
}

/// Validate the [clock] section
fn validate_clock(config: &toml::Value) -> Vec<String> {
    let clock = match config.get("clock") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => return vec!["[clock] must be a table".to_string()],
        None => return Vec::new(),
    };

    let steppers: Vec<String> = config
        .get("stepper")
        .and_then(|s| s.as_table())
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default();

    let mut errors = Vec::new();

    match clock.get("hand") {
        Some(toml::Value::String(hand)) => {
            if !steppers.contains(hand) {
                errors.push(format!("[clock] hand references unknown stepper '{}'", hand));
            }
        }
        Some(_) => errors.push("[clock] hand must be a string".to_string()),
        None => {}
    }

    errors
}
