//! GPIO port abstractions
//!
//! The coil pins of the clock steppers are addressed as a bit within a
//! named port, the way the reference board wires them. Chip-specific HALs
//! map `(port, bit)` onto their own pin numbering.

/// Number of addressable bits per port
pub const BITS_PER_PORT: u8 = 8;

/// Named output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Port A
    A,
    /// Port B
    B,
}

impl Port {
    /// All ports, in index order
    pub const ALL: [Port; 2] = [Port::A, Port::B];

    /// Zero-based index of the port
    pub const fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
        }
    }

    /// Port letter as used in config strings ("PA3" -> 'A')
    pub const fn letter(self) -> char {
        match self {
            Port::A => 'A',
            Port::B => 'B',
        }
    }

    /// Look up a port by its letter (case-insensitive)
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Port::A),
            'B' => Some(Port::B),
            _ => None,
        }
    }
}

/// Logic level of an output
///
/// `High` energizes a coil terminal (ON), `Low` releases it (OFF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0 (OFF)
    #[default]
    Low,
    /// Logic 1 (ON)
    High,
}

impl Level {
    /// Check if this is the high (ON) level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Bank of digital outputs addressed by port and bit
///
/// Implementations handle the actual register manipulation for the chip.
/// Writing a bit that was never configured as an output is not an error;
/// implementations may ignore it.
pub trait PortOutput {
    /// Drive one output to the given level
    fn write(&mut self, port: Port, bit: u8, level: Level);

    /// Put one pin into push-pull output mode
    ///
    /// Called once per pin at startup, before the control loop runs.
    fn configure_as_output(&mut self, port: Port, bit: u8);

    /// Drive one output high (ON)
    fn set_high(&mut self, port: Port, bit: u8) {
        self.write(port, bit, Level::High);
    }

    /// Drive one output low (OFF)
    fn set_low(&mut self, port: Port, bit: u8) {
        self.write(port, bit, Level::Low);
    }
}

impl<T: PortOutput + ?Sized> PortOutput for &mut T {
    fn write(&mut self, port: Port, bit: u8, level: Level) {
        (**self).write(port, bit, level);
    }

    fn configure_as_output(&mut self, port: Port, bit: u8) {
        (**self).configure_as_output(port, bit);
    }
}
