//! Host-side test doubles for ports and delays
//!
//! Ports and delay share a nanosecond clock so tests can check both the
//! levels written and when they were written.

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use gnomon_hal::{Level, Port, PortOutput};

use crate::pin::PinRef;

/// Shared simulated clock in nanoseconds
pub type SimClock = Rc<Cell<u64>>;

/// A single recorded pin write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub pin: PinRef,
    pub level: Level,
    /// Simulated time of the write in ms
    pub at_ms: u64,
}

/// Mock port bank recording every write
pub struct MockPorts {
    clock: SimClock,
    levels: [[Level; 8]; 2],
    pub writes: Vec<PinWrite>,
    pub configured: Vec<PinRef>,
}

impl MockPorts {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            levels: [[Level::Low; 8]; 2],
            writes: Vec::new(),
            configured: Vec::new(),
        }
    }

    /// Current level of a pin
    pub fn level(&self, pin: PinRef) -> Level {
        self.levels[pin.port().index()][pin.bit() as usize]
    }

    /// Force every pin high, as if left energized by earlier code
    pub fn set_all_high(&mut self) {
        self.levels = [[Level::High; 8]; 2];
    }

    /// Writes as (pin, level) pairs, dropping timestamps
    pub fn levels_written(&self) -> Vec<(PinRef, Level)> {
        self.writes.iter().map(|w| (w.pin, w.level)).collect()
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
    }
}

impl PortOutput for MockPorts {
    fn write(&mut self, port: Port, bit: u8, level: Level) {
        let pin = PinRef::new(port, bit).expect("mock write to invalid bit");
        self.levels[port.index()][bit as usize] = level;
        self.writes.push(PinWrite {
            pin,
            level,
            at_ms: self.clock.get() / 1_000_000,
        });
    }

    fn configure_as_output(&mut self, port: Port, bit: u8) {
        let pin = PinRef::new(port, bit).expect("mock configure of invalid bit");
        self.configured.push(pin);
    }
}

/// Mock blocking delay advancing the shared clock
pub struct MockDelay {
    clock: SimClock,
    /// Every millisecond wait requested, in order
    pub waits_ms: Vec<u32>,
}

impl MockDelay {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            waits_ms: Vec::new(),
        }
    }

    /// Total simulated time in ms
    pub fn now_ms(&self) -> u64 {
        self.clock.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.set(self.clock.get() + ns as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
        self.clock.set(self.clock.get() + ms as u64 * 1_000_000);
    }
}

/// Ports and delay sharing one fresh clock
pub fn bench() -> (MockPorts, MockDelay) {
    let clock = SimClock::default();
    (MockPorts::new(clock.clone()), MockDelay::new(clock))
}
