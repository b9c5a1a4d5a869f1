//! Step scheduler
//!
//! Turns pending-step counters into paced physical steps, one tick at a
//! time, and defines where those counters come from.

pub mod controller;
pub mod request;

pub use controller::{Controller, ControllerError, TickReport};
pub use request::{HalfDayClock, NoRequests, StepRequests, StepSource};
