//! Simple TOML parser for machine configuration
//!
//! This is a minimal, allocation-free parser that handles only the subset
//! of TOML that `machine.toml` uses. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Two-element string arrays for coil pins: `coil_a = ["PA3", "PA2"]`
//! - [section] headers, with `[stepper name]` or `[stepper.name]`
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Inline tables
//! - Dotted keys outside section headers

use heapless::String as HString;

use super::types::{
    ConfigError, MachineConfig, OverrunPolicy, StepperConfig, TimingConfig, SEC_PER_HALF_DAY,
    STEPS_PER_REV,
};
use crate::pin::{parse_pin_string, PinError, PinRef};
use crate::stepper::MAX_NAME_LEN;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Too many steppers (exceeded heapless capacity)
    TooManyItems,
    /// Two sections define the same stepper
    DuplicateStepper,
    /// Invalid pin string
    InvalidPin(PinError),
    /// Parsed config failed validation
    Invalid(ConfigError),
}

impl From<PinError> for ParseError {
    fn from(e: PinError) -> Self {
        ParseError::InvalidPin(e)
    }
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy)]
enum Section {
    Root,
    Timing,
    Clock,
    Stepper(usize),
}

/// Timing keys collected until the end of input
#[derive(Default)]
struct TimingKeys {
    tick_budget_ms: Option<u32>,
    period_s: Option<u32>,
    steps_per_rev: Option<u32>,
}

impl TimingKeys {
    fn resolve(&self, timing: &mut TimingConfig) -> Result<(), ParseError> {
        if let Some(budget) = self.tick_budget_ms {
            timing.tick_budget_ms = budget;
        } else if self.period_s.is_some() || self.steps_per_rev.is_some() {
            let period = self.period_s.unwrap_or(SEC_PER_HALF_DAY);
            let steps = self.steps_per_rev.unwrap_or(STEPS_PER_REV);
            timing.tick_budget_ms =
                TimingConfig::budget_for_period(period, steps).ok_or(ParseError::InvalidValue)?;
        }
        Ok(())
    }
}

/// Parse TOML configuration into a validated MachineConfig
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut timing_keys = TimingKeys::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = line
                .strip_suffix(']')
                .map(|h| &h[1..])
                .ok_or(ParseError::InvalidSection)?;
            section = open_section(header, &mut config)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Timing => apply_timing(key, value, &mut config.timing, &mut timing_keys)?,
            Section::Clock => apply_clock(key, value, &mut config)?,
            Section::Stepper(index) => apply_stepper(key, value, &mut config.steppers[index])?,
        }
    }

    timing_keys.resolve(&mut config.timing)?;
    config.validate()?;

    Ok(config)
}

/// Parse a section header and create any state it introduces
fn open_section(header: &str, config: &mut MachineConfig) -> Result<Section, ParseError> {
    let header = header.trim();

    let (kind, name) = match header.split_once(|c: char| c == '.' || c.is_whitespace()) {
        Some((kind, name)) => (kind.trim(), Some(name.trim())),
        None => (header, None),
    };

    match (kind, name) {
        ("timing", None) => Ok(Section::Timing),
        ("clock", None) => Ok(Section::Clock),
        ("stepper", Some(name)) if !name.is_empty() => {
            if name.len() > MAX_NAME_LEN || name.contains(char::is_whitespace) {
                return Err(ParseError::InvalidSection);
            }
            if config.find_stepper(name).is_some() {
                return Err(ParseError::DuplicateStepper);
            }
            config
                .steppers
                .push(StepperConfig::named(name))
                .map_err(|_| ParseError::TooManyItems)?;
            Ok(Section::Stepper(config.steppers.len() - 1))
        }
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_timing(
    key: &str,
    value: &str,
    timing: &mut TimingConfig,
    keys: &mut TimingKeys,
) -> Result<(), ParseError> {
    match key {
        "tick_budget_ms" => keys.tick_budget_ms = Some(parse_int(value)?),
        "period_s" => keys.period_s = Some(parse_int(value)?),
        "steps_per_rev" => keys.steps_per_rev = Some(parse_int(value)?),
        "pulse_ms" => timing.pulse_ms = parse_int(value)?,
        "overrun" => timing.overrun = parse_overrun(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_clock(key: &str, value: &str, config: &mut MachineConfig) -> Result<(), ParseError> {
    match key {
        "hand" => {
            let name = parse_string(value)?;
            config.hand = Some(HString::try_from(name).map_err(|_| ParseError::InvalidValue)?);
        }
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_stepper(key: &str, value: &str, stepper: &mut StepperConfig) -> Result<(), ParseError> {
    match key {
        "coil_a" => stepper.coil_a = Some(parse_pin_pair(value)?),
        "coil_b" => stepper.coil_b = Some(parse_pin_pair(value)?),
        "release_when_idle" => stepper.release_when_idle = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    // Remove inline comments
    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int(value: &str) -> Result<u32, ParseError> {
    let mut digits: HString<16> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse overrun policy
fn parse_overrun(value: &str) -> Result<OverrunPolicy, ParseError> {
    OverrunPolicy::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)
}

/// Parse a coil's terminal pins: `["PA3", "PA2"]`
fn parse_pin_pair(value: &str) -> Result<[PinRef; 2], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut parts = inner.split(',').map(str::trim).filter(|p| !p.is_empty());
    let first = parts.next().ok_or(ParseError::InvalidValue)?;
    let second = parts.next().ok_or(ParseError::InvalidValue)?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidValue);
    }

    Ok([
        parse_pin_string(parse_string(first)?)?,
        parse_pin_string(parse_string(second)?)?,
    ])
}
