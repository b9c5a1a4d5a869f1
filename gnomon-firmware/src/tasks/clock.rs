//! Clock task
//!
//! Owns the controller and the port bank. Stepping inside a tick busy-waits
//! on `embassy_time::Delay`; the task only yields between ticks, while it
//! waits out the rest of the tick budget.

use defmt::*;
use embassy_time::{Delay, Instant, Timer};

use gnomon_core::scheduler::HalfDayClock;
use gnomon_core::Controller;
use gnomon_hal_rp2040::PortBank;

/// Controller driven by the half-day clock (if a hand is configured)
pub type ClockController = Controller<Option<HalfDayClock>>;

/// Clock task - runs the control loop forever
#[embassy_executor::task]
pub async fn clock_task(mut controller: ClockController, mut bank: PortBank) {
    info!("Clock task started");

    controller.configure_outputs(&mut bank);
    controller.disable_all(&mut bank);
    debug!("{} outputs configured, all coils off", bank.configured_count());

    match controller.source() {
        Some(clock) => info!("Hand is motor {}", clock.hand().index()),
        None => warn!("No hand configured, steppers move only on request"),
    }

    let mut delay = Delay;

    loop {
        let started = Instant::now();
        let report = controller.tick(&mut bank, &mut delay);

        trace!(
            "Tick {}: stepped {} ms (measured {} ms), idle {} ms",
            report.tick,
            report.elapsed_ms,
            started.elapsed().as_millis(),
            report.idle_ms
        );

        Timer::after_millis(report.idle_ms as u64).await;
    }
}
