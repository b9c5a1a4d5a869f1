//! Board-agnostic core logic for the clock stepper firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Pin references and coil wiring
//! - The 4-phase energization pattern and direction remapping
//! - The tick scheduler that paces steps against wall-clock time
//! - Step request sources (the half-day clock)
//! - Configuration types and the `machine.toml` parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod pin;
pub mod scheduler;
pub mod stepper;

#[cfg(test)]
mod testing;

pub use pin::{PinError, PinRef};
pub use scheduler::{Controller, TickReport};
pub use stepper::{CoilMap, Direction, Motor, MotorId, PhaseSequencer};
