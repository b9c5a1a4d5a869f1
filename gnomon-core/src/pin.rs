//! Pin references
//!
//! A [`PinRef`] names exactly one physical output as a port plus a bit
//! index. It carries no ownership of the pin; two equal references address
//! the same output.

use core::fmt;

use gnomon_hal::{Level, Port, PortOutput, BITS_PER_PORT};

/// Errors from constructing or parsing a pin reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// String is not of the form "P<port><bit>"
    Malformed,
    /// Port letter is not one of the known ports
    UnknownPort,
    /// Bit index is outside 0-7
    BitOutOfRange,
}

/// Reference to a single digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinRef {
    port: Port,
    bit: u8,
}

impl PinRef {
    /// Create a pin reference, checking the bit index
    pub const fn new(port: Port, bit: u8) -> Result<Self, PinError> {
        if bit >= BITS_PER_PORT {
            return Err(PinError::BitOutOfRange);
        }
        Ok(Self { port, bit })
    }

    /// Pin on port A
    ///
    /// Panics at compile time when used in a const context with a bad bit.
    pub const fn a(bit: u8) -> Self {
        match Self::new(Port::A, bit) {
            Ok(pin) => pin,
            Err(_) => panic!("port A bit out of range"),
        }
    }

    /// Pin on port B
    pub const fn b(bit: u8) -> Self {
        match Self::new(Port::B, bit) {
            Ok(pin) => pin,
            Err(_) => panic!("port B bit out of range"),
        }
    }

    /// Port this pin lives on
    #[inline]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Bit index within the port (0-7)
    #[inline]
    pub const fn bit(&self) -> u8 {
        self.bit
    }

    /// Drive this pin to a level
    #[inline]
    pub fn write<P: PortOutput + ?Sized>(&self, out: &mut P, level: Level) {
        out.write(self.port, self.bit, level);
    }

    /// Configure this pin as an output
    #[inline]
    pub fn configure<P: PortOutput + ?Sized>(&self, out: &mut P) {
        out.configure_as_output(self.port, self.bit);
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port.letter(), self.bit)
    }
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "PA3" -> (Port A, bit 3)
/// - "pb0" -> (Port B, bit 0)
/// - Surrounding whitespace is ignored
pub fn parse_pin_string(s: &str) -> Result<PinRef, PinError> {
    let s = s.trim();
    let mut chars = s.chars();

    match chars.next() {
        Some('P') | Some('p') => {}
        _ => return Err(PinError::Malformed),
    }

    let port = chars.next().ok_or(PinError::Malformed)?;
    let port = Port::from_letter(port).ok_or(PinError::UnknownPort)?;

    let bit_str = chars.as_str();
    if bit_str.is_empty() || !bit_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PinError::Malformed);
    }
    let bit: u8 = bit_str.parse().map_err(|_| PinError::BitOutOfRange)?;

    PinRef::new(port, bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_bit() {
        assert!(PinRef::new(Port::A, 0).is_ok());
        assert!(PinRef::new(Port::B, 7).is_ok());
        assert_eq!(PinRef::new(Port::A, 8), Err(PinError::BitOutOfRange));
    }

    #[test]
    fn test_const_constructors() {
        const HAND_A0: PinRef = PinRef::a(3);
        assert_eq!(HAND_A0.port(), Port::A);
        assert_eq!(HAND_A0.bit(), 3);
        assert_eq!(PinRef::b(2), PinRef::new(Port::B, 2).unwrap());
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("PA3"), Ok(PinRef::a(3)));
        assert_eq!(parse_pin_string("PB0"), Ok(PinRef::b(0)));
        assert_eq!(parse_pin_string(" pa7 "), Ok(PinRef::a(7)));
        assert_eq!(parse_pin_string("PA03"), Ok(PinRef::a(3)));

        // Invalid
        assert_eq!(parse_pin_string("PA8"), Err(PinError::BitOutOfRange));
        assert_eq!(parse_pin_string("PA300"), Err(PinError::BitOutOfRange));
        assert_eq!(parse_pin_string("PC1"), Err(PinError::UnknownPort));
        assert_eq!(parse_pin_string("gpio11"), Err(PinError::Malformed));
        assert_eq!(parse_pin_string("PA"), Err(PinError::Malformed));
        assert_eq!(parse_pin_string("PA-1"), Err(PinError::Malformed));
        assert_eq!(parse_pin_string("PA+3"), Err(PinError::Malformed));
        assert_eq!(parse_pin_string(""), Err(PinError::Malformed));
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        use std::string::ToString;

        let pin = PinRef::b(5);
        assert_eq!(pin.to_string(), "PB5");
        assert_eq!(parse_pin_string(&pin.to_string()), Ok(pin));
    }
}
