//! Embassy tasks

mod clock;

pub use clock::{clock_task, ClockController};
