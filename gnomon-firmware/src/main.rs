//! Gnomon - Half-Day Clock Stepper Firmware
//!
//! Main firmware binary for RP2040-based boards. Drives the clock hand and
//! the pitch indicator from two 4-terminal steppers, wired as described in
//! `machine.toml`.
//!
//! Named after the gnomon of a sundial, whose shadow tells the time by
//! moving at a constant rate.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use gnomon_core::config::MachineConfig;
use gnomon_core::Controller;
use gnomon_hal_rp2040::PortBank;

use crate::tasks::ClockController;

mod config;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Gnomon firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);

    // Ports A and B live on GPIO 0-15
    let bank = PortBank::new([
        p.PIN_0.into(),
        p.PIN_1.into(),
        p.PIN_2.into(),
        p.PIN_3.into(),
        p.PIN_4.into(),
        p.PIN_5.into(),
        p.PIN_6.into(),
        p.PIN_7.into(),
        p.PIN_8.into(),
        p.PIN_9.into(),
        p.PIN_10.into(),
        p.PIN_11.into(),
        p.PIN_12.into(),
        p.PIN_13.into(),
        p.PIN_14.into(),
        p.PIN_15.into(),
    ]);

    let controller = build_controller(&config);
    info!(
        "Controller ready: {} steppers, tick budget {} ms, pulse {} ms",
        controller.motors().len(),
        controller.timing().tick_budget_ms,
        controller.timing().pulse_ms
    );

    spawner.spawn(tasks::clock_task(controller, bank)).unwrap();

    info!("All tasks spawned");
}

/// Build the controller, falling back to an idle one if wiring is unusable
fn build_controller(config: &MachineConfig) -> ClockController {
    match Controller::from_config(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Controller setup failed: {:?}, running without steppers", e);
            Controller::new(config.timing).with_source(None)
        }
    }
}
