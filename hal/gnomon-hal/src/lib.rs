//! Gnomon Hardware Abstraction Layer
//!
//! This crate defines the hardware boundary of the clock firmware so the
//! stepper sequencing in `gnomon-core` can run against any chip, and
//! against mock ports on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (gnomon-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gnomon-core (sequencing, scheduling)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gnomon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  gnomon-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::PortOutput`] - Port/bit addressed digital outputs
//!
//! Timing uses `embedded_hal::delay::DelayNs` directly; there is no
//! wrapper trait for it here.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

// Re-export key types at crate root for convenience
pub use gpio::{Level, Port, PortOutput, BITS_PER_PORT};
