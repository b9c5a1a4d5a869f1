//! Step request sources
//!
//! Something outside the control loop decides how far each motor should
//! move: for the clock, "one step of the hand per tick". Sources are polled
//! at the start of every tick and write into the pending-step counters.

use crate::stepper::{Motor, MotorId};

/// Write access to the pending-step counters during a poll
pub struct StepRequests<'a> {
    motors: &'a mut [Motor],
}

impl<'a> StepRequests<'a> {
    pub(crate) fn new(motors: &'a mut [Motor]) -> Self {
        Self { motors }
    }

    /// Add a signed delta to a motor's counter (saturating)
    ///
    /// Returns false if the motor does not exist.
    pub fn add(&mut self, id: MotorId, delta: i16) -> bool {
        match self.motors.get_mut(id.index()) {
            Some(motor) => {
                motor.add_pending(delta);
                true
            }
            None => false,
        }
    }

    /// Overwrite a motor's counter
    ///
    /// Returns false if the motor does not exist.
    pub fn set(&mut self, id: MotorId, steps: i16) -> bool {
        match self.motors.get_mut(id.index()) {
            Some(motor) => {
                motor.set_pending(steps);
                true
            }
            None => false,
        }
    }

    /// Current counter of a motor
    pub fn pending(&self, id: MotorId) -> Option<i16> {
        self.motors.get(id.index()).map(Motor::pending)
    }

    /// Number of registered motors
    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }
}

/// Producer of pending steps, polled once per tick
pub trait StepSource {
    /// Called before motors are serviced on tick number `tick`
    fn poll(&mut self, tick: u32, requests: &mut StepRequests<'_>);
}

/// Source that never requests anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRequests;

impl StepSource for NoRequests {
    fn poll(&mut self, _tick: u32, _requests: &mut StepRequests<'_>) {}
}

impl StepSource for () {
    fn poll(&mut self, _tick: u32, _requests: &mut StepRequests<'_>) {}
}

impl<S: StepSource> StepSource for Option<S> {
    fn poll(&mut self, tick: u32, requests: &mut StepRequests<'_>) {
        if let Some(source) = self {
            source.poll(tick, requests);
        }
    }
}

/// Advances the hand one step every tick
///
/// The hand's counter is set to exactly one step at each poll, so the
/// clock alone never builds up a backlog. Any other request made for the
/// hand between polls is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalfDayClock {
    hand: MotorId,
}

impl HalfDayClock {
    pub const fn new(hand: MotorId) -> Self {
        Self { hand }
    }

    /// Motor this clock drives
    pub const fn hand(&self) -> MotorId {
        self.hand
    }
}

impl StepSource for HalfDayClock {
    fn poll(&mut self, _tick: u32, requests: &mut StepRequests<'_>) {
        requests.set(self.hand, 1);
    }
}
