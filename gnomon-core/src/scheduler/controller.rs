//! Step scheduler
//!
//! The controller owns every motor and runs the control loop. Each tick:
//!
//! 1. the request source may update pending-step counters,
//! 2. motors are serviced last-registered first; a motor with steps owed
//!    gets its direction resolved from the counter's sign and one physical
//!    step, then its counter moves one unit toward zero,
//! 3. whatever is left of the tick budget is spent idle.
//!
//! All pulses of one motor finish before the next motor is touched.

use embedded_hal::delay::DelayNs;
use gnomon_hal::PortOutput;
use heapless::Vec;

use super::request::{HalfDayClock, NoRequests, StepRequests, StepSource};
use crate::config::{MachineConfig, OverrunPolicy, TimingConfig, MAX_MOTORS};
use crate::stepper::{Motor, MotorId, PhaseSequencer};

/// Controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// No room for another motor
    TooManyMotors,
    /// A configured stepper has no coil pins
    UnwiredStepper,
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Tick number (0-based)
    pub tick: u32,
    /// Time spent stepping
    pub elapsed_ms: u32,
    /// Time left to wait before the next tick
    pub idle_ms: u32,
    /// How far this tick's stepping ran past the budget
    pub overrun_ms: u32,
    /// Bit `i` set if motor `i` stepped this tick
    pub serviced: u8,
}

impl TickReport {
    /// Check if a motor stepped during this tick
    pub fn stepped(&self, id: MotorId) -> bool {
        id.index() < 8 && self.serviced & (1 << id.index()) != 0
    }
}

/// Owner of all motor state and the tick loop
pub struct Controller<S = NoRequests> {
    motors: Vec<Motor, MAX_MOTORS>,
    sequencer: PhaseSequencer,
    timing: TimingConfig,
    source: S,
    deficit_ms: u32,
    ticks: u32,
}

impl Controller<NoRequests> {
    /// Create a controller with no motors and no request source
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            motors: Vec::new(),
            sequencer: PhaseSequencer::new(timing.pulse_ms),
            timing,
            source: NoRequests,
            deficit_ms: 0,
            ticks: 0,
        }
    }
}

impl Controller<Option<HalfDayClock>> {
    /// Build a controller from a validated machine config
    ///
    /// Motors are registered in config order. If the config names a hand,
    /// it is advanced one step per tick.
    pub fn from_config(config: &MachineConfig) -> Result<Self, ControllerError> {
        let mut controller = Controller::new(config.timing);
        for stepper in &config.steppers {
            let motor = stepper.to_motor().ok_or(ControllerError::UnwiredStepper)?;
            controller.register(motor)?;
        }

        let clock = config
            .hand
            .as_ref()
            .and_then(|name| config.stepper_index(name))
            .map(|index| HalfDayClock::new(MotorId(index as u8)));

        Ok(controller.with_source(clock))
    }
}

impl<S: StepSource> Controller<S> {
    /// Replace the request source
    pub fn with_source<T: StepSource>(self, source: T) -> Controller<T> {
        Controller {
            motors: self.motors,
            sequencer: self.sequencer,
            timing: self.timing,
            source,
            deficit_ms: self.deficit_ms,
            ticks: self.ticks,
        }
    }

    /// Register a motor; motors are serviced in reverse registration order
    pub fn register(&mut self, motor: Motor) -> Result<MotorId, ControllerError> {
        let id = MotorId(self.motors.len() as u8);
        self.motors
            .push(motor)
            .map_err(|_| ControllerError::TooManyMotors)?;
        Ok(id)
    }

    /// Look up a motor
    pub fn motor(&self, id: MotorId) -> Option<&Motor> {
        self.motors.get(id.index())
    }

    /// All motors in registration order
    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    /// Loop timing in use
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Request source in use
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Overrun still to be repaid (always 0 under `Clamp`)
    pub fn deficit_ms(&self) -> u32 {
        self.deficit_ms
    }

    /// Steps still owed to a motor
    pub fn pending(&self, id: MotorId) -> Option<i16> {
        self.motor(id).map(Motor::pending)
    }

    /// Add a signed number of steps to a motor's counter
    ///
    /// Returns false if the motor does not exist.
    pub fn request(&mut self, id: MotorId, delta: i16) -> bool {
        StepRequests::new(&mut self.motors).add(id, delta)
    }

    /// Overwrite a motor's counter
    pub fn set_pending(&mut self, id: MotorId, steps: i16) -> bool {
        StepRequests::new(&mut self.motors).set(id, steps)
    }

    /// Select a motor's direction from the sign of `dir`
    ///
    /// Returns false if the motor does not exist.
    pub fn set_direction(&mut self, id: MotorId, dir: i16) -> bool {
        match self.motors.get_mut(id.index()) {
            Some(motor) => {
                motor.set_direction(dir);
                true
            }
            None => false,
        }
    }

    /// Advance one motor one step in its current direction
    ///
    /// Returns the time consumed, or `None` if the motor does not exist.
    pub fn step<P, D>(&mut self, id: MotorId, out: &mut P, delay: &mut D) -> Option<u32>
    where
        P: PortOutput + ?Sized,
        D: DelayNs + ?Sized,
    {
        let motor = self.motors.get(id.index())?;
        Some(self.sequencer.step(motor.coils(), out, delay))
    }

    /// De-energize one motor
    pub fn disable<P: PortOutput + ?Sized>(&self, id: MotorId, out: &mut P) {
        if let Some(motor) = self.motors.get(id.index()) {
            self.sequencer.disable(motor.coils(), out);
        }
    }

    /// De-energize every motor
    pub fn disable_all<P: PortOutput + ?Sized>(&self, out: &mut P) {
        for motor in &self.motors {
            self.sequencer.disable(motor.coils(), out);
        }
    }

    /// Configure every coil pin as an output
    pub fn configure_outputs<P: PortOutput + ?Sized>(&self, out: &mut P) {
        for motor in &self.motors {
            for pin in motor.coils().pins() {
                pin.configure(out);
            }
        }
    }

    /// Run one tick without the idle wait
    ///
    /// Blocks for the stepping time only. The returned report says how long
    /// to idle before calling `tick` again.
    pub fn tick<P, D>(&mut self, out: &mut P, delay: &mut D) -> TickReport
    where
        P: PortOutput + ?Sized,
        D: DelayNs + ?Sized,
    {
        let tick = self.ticks;
        self.source.poll(tick, &mut StepRequests::new(&mut self.motors));

        let mut elapsed_ms = 0u32;
        let mut serviced = 0u8;

        for (index, motor) in self.motors.iter_mut().enumerate().rev() {
            let pending = motor.pending();
            if pending != 0 {
                motor.set_direction(pending);
                let step_ms = self.sequencer.step(motor.coils(), out, delay);
                elapsed_ms = elapsed_ms.saturating_add(step_ms);
                serviced |= 1 << index;
            } else if motor.release_when_idle() {
                self.sequencer.disable(motor.coils(), out);
            }
            motor.decay_pending();
        }

        let budget = self.timing.tick_budget_ms;
        let overrun_ms = elapsed_ms.saturating_sub(budget);
        let idle_ms = match self.timing.overrun {
            OverrunPolicy::Clamp => budget.saturating_sub(elapsed_ms),
            OverrunPolicy::CarryDeficit => {
                let owed = elapsed_ms.saturating_add(self.deficit_ms);
                self.deficit_ms = owed.saturating_sub(budget);
                budget.saturating_sub(owed)
            }
        };

        #[cfg(feature = "defmt")]
        {
            if overrun_ms > 0 {
                defmt::warn!(
                    "tick {}: stepping took {} ms, {} ms over budget",
                    tick,
                    elapsed_ms,
                    overrun_ms
                );
            }
            defmt::trace!(
                "tick {}: serviced={=u8:b}, elapsed={} ms, idle={} ms",
                tick,
                serviced,
                elapsed_ms,
                idle_ms
            );
        }

        self.ticks = self.ticks.wrapping_add(1);

        TickReport {
            tick,
            elapsed_ms,
            idle_ms,
            overrun_ms,
            serviced,
        }
    }

    /// Run the control loop forever with blocking idle waits
    pub fn run<P, D>(&mut self, out: &mut P, delay: &mut D) -> !
    where
        P: PortOutput + ?Sized,
        D: DelayNs + ?Sized,
    {
        loop {
            let report = self.tick(out, delay);
            delay.delay_ms(report.idle_ms);
        }
    }
}
