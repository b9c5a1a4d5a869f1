//! Stepper coil handling
//!
//! Everything needed to move one 4-terminal stepper one step: its wiring,
//! direction remapping and the phase pattern.

pub mod coil;
pub mod motor;
pub mod sequencer;

pub use coil::{CoilMap, CoilPins, Direction};
pub use motor::{Motor, MotorId, MAX_NAME_LEN};
pub use sequencer::{Phase, PhaseSequencer, DEFAULT_PULSE_MS, PHASES, PHASES_PER_STEP};
