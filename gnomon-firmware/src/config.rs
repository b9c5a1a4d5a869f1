//! Configuration loading
//!
//! Parses the embedded `machine.toml`. Falls back to the reference wiring
//! if the embedded text does not parse or validate.

use defmt::*;

use gnomon_core::config::{parse_config, MachineConfig};

/// Parse the embedded config, or fall back to the reference board
pub fn load(source: &str) -> MachineConfig {
    match parse_config(source) {
        Ok(config) => {
            info!("Loaded config: {} steppers", config.steppers.len());
            for stepper in &config.steppers {
                debug!(
                    "Stepper '{}': release_when_idle={}",
                    stepper.name.as_str(),
                    stepper.release_when_idle
                );
            }
            config
        }
        Err(e) => {
            warn!("Embedded config invalid: {:?}, using reference wiring", e);
            MachineConfig::reference()
        }
    }
}
