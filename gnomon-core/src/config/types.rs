//! Configuration types
//!
//! Timing parameters and the board description for the clock steppers.

use heapless::{String, Vec};

use crate::pin::PinRef;
use crate::stepper::{CoilPins, Motor, DEFAULT_PULSE_MS, MAX_NAME_LEN};

/// Maximum steppers per config
pub const MAX_MOTORS: usize = 4;

/// Seconds in half a day (one revolution of the hand)
pub const SEC_PER_HALF_DAY: u32 = 12 * 3600;

/// Full steps per revolution of the reference motors
pub const STEPS_PER_REV: u32 = 200;

/// Default tick budget: one step every 216 s
pub const DEFAULT_TICK_BUDGET_MS: u32 = SEC_PER_HALF_DAY / STEPS_PER_REV * 1000;

/// What to do when stepping takes longer than the tick budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverrunPolicy {
    /// Wait zero and forget the overrun (long-run drift)
    #[default]
    Clamp,
    /// Shorten following ticks until the overrun is repaid
    CarryDeficit,
}

impl OverrunPolicy {
    /// Look up a policy by its config name
    ///
    /// Accepts "clamp" and "carry" (or "carry_deficit"), plus the variant
    /// names themselves.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clamp" | "Clamp" => Some(OverrunPolicy::Clamp),
            "carry" | "carry_deficit" | "CarryDeficit" => Some(OverrunPolicy::CarryDeficit),
            _ => None,
        }
    }
}

/// Control loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Wall-clock time one tick consumes, stepping included
    pub tick_budget_ms: u32,
    /// Hold time per phase
    pub pulse_ms: u32,
    /// Overrun handling
    pub overrun: OverrunPolicy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: DEFAULT_TICK_BUDGET_MS,
            pulse_ms: DEFAULT_PULSE_MS,
            overrun: OverrunPolicy::Clamp,
        }
    }
}

impl TimingConfig {
    /// Budget for one step per tick over a full revolution period
    ///
    /// Returns `None` when `steps_per_rev` is zero.
    pub fn budget_for_period(period_s: u32, steps_per_rev: u32) -> Option<u32> {
        if steps_per_rev == 0 {
            return None;
        }
        Some(((period_s as u64 * 1000) / steps_per_rev as u64).min(u32::MAX as u64) as u32)
    }
}

/// One stepper's wiring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperConfig {
    /// Stepper name (e.g., "hand", "pitch")
    pub name: String<MAX_NAME_LEN>,
    /// Coil A terminal pins
    pub coil_a: Option<[PinRef; 2]>,
    /// Coil B terminal pins
    pub coil_b: Option<[PinRef; 2]>,
    /// De-energize between steps
    pub release_when_idle: bool,
}

impl StepperConfig {
    /// Create a fully wired stepper config
    pub fn new(name: &str, coil_a: [PinRef; 2], coil_b: [PinRef; 2]) -> Self {
        let mut config = Self::named(name);
        config.coil_a = Some(coil_a);
        config.coil_b = Some(coil_b);
        config
    }

    /// Create an unwired stepper config
    pub fn named(name: &str) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            coil_a: None,
            coil_b: None,
            release_when_idle: false,
        }
    }

    /// Both coils, if both are wired
    pub fn coil_pins(&self) -> Option<CoilPins> {
        Some([self.coil_a?, self.coil_b?])
    }

    /// Build the runtime motor
    pub fn to_motor(&self) -> Option<Motor> {
        let coils = self.coil_pins()?;
        Some(Motor::new(&self.name, coils).with_release_when_idle(self.release_when_idle))
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No steppers configured
    NoSteppers,
    /// A stepper is missing a coil
    MissingCoil,
    /// The same pin is used twice
    DuplicatePin(PinRef),
    /// Hand stepper name does not match any stepper
    UnknownHand,
    /// Tick budget is zero
    ZeroBudget,
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineConfig {
    /// Control loop timing
    pub timing: TimingConfig,
    /// Steppers in registration order
    pub steppers: Vec<StepperConfig, MAX_MOTORS>,
    /// Stepper that advances once per tick (the clock hand)
    pub hand: Option<String<MAX_NAME_LEN>>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineConfig {
    /// Empty config with default timing
    pub fn new() -> Self {
        Self {
            timing: TimingConfig::default(),
            steppers: Vec::new(),
            hand: None,
        }
    }

    /// The reference board: hand on PA3/PA2 + PA1/PA0, pitch on PB0/PB1 + PB2/PA7
    pub fn reference() -> Self {
        let mut config = Self::new();
        let _ = config.steppers.push(StepperConfig::new(
            "hand",
            [PinRef::a(3), PinRef::a(2)],
            [PinRef::a(1), PinRef::a(0)],
        ));
        let _ = config.steppers.push(StepperConfig::new(
            "pitch",
            [PinRef::b(0), PinRef::b(1)],
            [PinRef::b(2), PinRef::a(7)],
        ));
        config.hand = String::try_from("hand").ok();
        config
    }

    /// Find a stepper by name
    pub fn find_stepper(&self, name: &str) -> Option<&StepperConfig> {
        self.steppers.iter().find(|s| s.name.as_str() == name)
    }

    /// Registration index of a stepper
    pub fn stepper_index(&self, name: &str) -> Option<usize> {
        self.steppers.iter().position(|s| s.name.as_str() == name)
    }

    /// Check the config is usable by the controller
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_budget_ms == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.steppers.is_empty() {
            return Err(ConfigError::NoSteppers);
        }

        let mut seen: Vec<PinRef, { MAX_MOTORS * 4 }> = Vec::new();
        for stepper in &self.steppers {
            let coils = stepper.coil_pins().ok_or(ConfigError::MissingCoil)?;
            for pin in coils.iter().flatten() {
                if seen.contains(pin) {
                    return Err(ConfigError::DuplicatePin(*pin));
                }
                // Capacity is MAX_MOTORS * 4, never exceeded
                let _ = seen.push(*pin);
            }
        }

        if let Some(hand) = &self.hand {
            if self.find_stepper(hand).is_none() {
                return Err(ConfigError::UnknownHand);
            }
        }

        Ok(())
    }
}
