//! Port-addressed GPIO outputs
//!
//! [`PortBank`] owns the GPIOs that back ports A and B. Pins start out
//! unclaimed and become push-pull outputs on `configure_as_output`.

use embassy_rp::gpio::{AnyPin, Level as RpLevel, Output};
use embassy_rp::Peri;

use gnomon_hal::{Level, Port, PortOutput, BITS_PER_PORT};

/// Number of GPIOs covered by the two ports
pub const PORT_GPIO_COUNT: usize = Port::ALL.len() * BITS_PER_PORT as usize;

/// GPIO number backing a port bit
///
/// Returns `None` for a bit outside the port.
pub const fn gpio_number(port: Port, bit: u8) -> Option<u8> {
    if bit >= BITS_PER_PORT {
        return None;
    }
    Some(port.index() as u8 * BITS_PER_PORT + bit)
}

const fn rp_level(level: Level) -> RpLevel {
    match level {
        Level::Low => RpLevel::Low,
        Level::High => RpLevel::High,
    }
}

/// GPIO bank implementing [`PortOutput`]
pub struct PortBank {
    /// Pins not yet configured, indexed by GPIO number
    idle: [Option<Peri<'static, AnyPin>>; PORT_GPIO_COUNT],
    /// Configured outputs, indexed by GPIO number
    outputs: [Option<Output<'static>>; PORT_GPIO_COUNT],
}

impl PortBank {
    /// Create a bank from GPIO 0-15, in GPIO order
    ///
    /// ```ignore
    /// let bank = PortBank::new([p.PIN_0.into(), p.PIN_1.into(), /* ... */ p.PIN_15.into()]);
    /// ```
    pub fn new(pins: [Peri<'static, AnyPin>; PORT_GPIO_COUNT]) -> Self {
        Self {
            idle: pins.map(Some),
            outputs: core::array::from_fn(|_| None),
        }
    }

    /// Check whether a port bit has been configured as an output
    pub fn is_configured(&self, port: Port, bit: u8) -> bool {
        gpio_number(port, bit)
            .and_then(|gpio| self.outputs.get(gpio as usize))
            .is_some_and(Option::is_some)
    }

    /// Number of configured outputs
    pub fn configured_count(&self) -> usize {
        self.outputs.iter().filter(|o| o.is_some()).count()
    }
}

impl PortOutput for PortBank {
    fn write(&mut self, port: Port, bit: u8, level: Level) {
        let output = gpio_number(port, bit).and_then(|gpio| self.outputs.get_mut(gpio as usize));
        match output {
            Some(Some(output)) => output.set_level(rp_level(level)),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Write to unconfigured pin P{}{}", port.letter(), bit);
            }
        }
    }

    fn configure_as_output(&mut self, port: Port, bit: u8) {
        let Some(gpio) = gpio_number(port, bit) else {
            return;
        };
        let gpio = gpio as usize;
        // Already configured pins keep their current level
        if let Some(pin) = self.idle[gpio].take() {
            self.outputs[gpio] = Some(Output::new(pin, RpLevel::Low));
        }
    }
}
