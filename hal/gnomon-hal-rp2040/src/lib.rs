//! RP2040-specific HAL for the Gnomon firmware
//!
//! Implements the shared `gnomon-hal` port interface on top of embassy-rp
//! GPIO outputs. The two 8-bit ports of the board description are laid
//! over the first 16 GPIOs:
//!
//! - Port A bit n -> GPIO n
//! - Port B bit n -> GPIO 8 + n

#![no_std]

pub mod gpio;

pub use gpio::{gpio_number, PortBank, PORT_GPIO_COUNT};
