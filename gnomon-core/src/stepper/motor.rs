//! Motor state
//!
//! A motor pairs its coil map with the pending-step counter the scheduler
//! consumes. The counter's sign is the direction, its magnitude the number
//! of physical steps still owed.

use heapless::String;

use super::coil::{CoilMap, CoilPins};

/// Maximum motor name length
pub const MAX_NAME_LEN: usize = 16;

/// Index of a motor in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorId(pub u8);

impl MotorId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One stepper motor and its outstanding steps
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motor {
    name: String<MAX_NAME_LEN>,
    coils: CoilMap,
    pending: i16,
    release_when_idle: bool,
}

impl Motor {
    /// Create a motor with no pending steps
    ///
    /// Names longer than [`MAX_NAME_LEN`] are truncated.
    pub fn new(name: &str, coils: CoilPins) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            coils: CoilMap::new(coils),
            pending: 0,
            release_when_idle: false,
        }
    }

    /// De-energize this motor on ticks where it has nothing to do
    pub fn with_release_when_idle(mut self, release: bool) -> Self {
        self.release_when_idle = release;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn coils(&self) -> &CoilMap {
        &self.coils
    }

    /// Remap the active coil ordering for a signed delta
    #[inline]
    pub fn set_direction(&mut self, dir: i16) {
        self.coils.set_direction(dir);
    }

    #[inline]
    pub fn release_when_idle(&self) -> bool {
        self.release_when_idle
    }

    /// Steps still owed (signed)
    #[inline]
    pub fn pending(&self) -> i16 {
        self.pending
    }

    /// Overwrite the pending-step counter
    #[inline]
    pub fn set_pending(&mut self, steps: i16) {
        self.pending = steps;
    }

    /// Add to the pending-step counter, saturating at the i16 range
    #[inline]
    pub fn add_pending(&mut self, delta: i16) {
        self.pending = self.pending.saturating_add(delta);
    }

    /// Move the counter one unit toward zero
    ///
    /// Returns the counter value before the move.
    pub fn decay_pending(&mut self) -> i16 {
        let before = self.pending;
        if self.pending > 0 {
            self.pending -= 1;
        } else if self.pending < 0 {
            self.pending += 1;
        }
        before
    }
}
