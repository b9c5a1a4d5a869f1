//! Phase sequencer
//!
//! One physical step is four phases. Each phase writes both terminals of
//! one coil pair of the active configuration, then holds for the pulse
//! duration. The pair not addressed by a phase keeps whatever level the
//! previous phase left on it, so consecutive phases overlap on both pairs:
//!
//! ```text
//! phase   pair   t0    t1
//!   0      0     ON    OFF
//!   1      1     OFF   ON
//!   2      0     OFF   ON
//!   3      1     ON    OFF
//! ```
//!
//! The sequencer is the only code that writes ON levels to coil pins.

use embedded_hal::delay::DelayNs;
use gnomon_hal::{Level, PortOutput};

use super::coil::CoilMap;

/// Default hold time per phase in milliseconds
pub const DEFAULT_PULSE_MS: u32 = 3;

/// Number of phases per physical step
pub const PHASES_PER_STEP: usize = 4;

/// One energization pattern: which active pair, and the terminal levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phase {
    /// Index into the active configuration (0 or 1)
    pub pair: usize,
    /// Levels for terminal 0 and terminal 1
    pub levels: [Level; 2],
}

/// Energization pattern for one step, applied in order
///
/// Phase `i` addresses pair `i % 2`. Addressing the same pair in two
/// consecutive phases (0, 0, 1, 1) reverses that coil's current in one move,
/// a half-turn jump of the field that stalls the rotor.
pub const PHASES: [Phase; PHASES_PER_STEP] = [
    Phase {
        pair: 0,
        levels: [Level::High, Level::Low],
    },
    Phase {
        pair: 1,
        levels: [Level::Low, Level::High],
    },
    Phase {
        pair: 0,
        levels: [Level::Low, Level::High],
    },
    Phase {
        pair: 1,
        levels: [Level::High, Level::Low],
    },
];

/// Applies the phase pattern with a fixed hold per phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseSequencer {
    pulse_ms: u32,
}

impl Default for PhaseSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE_MS)
    }
}

impl PhaseSequencer {
    /// Create a sequencer holding each phase for `pulse_ms`
    pub const fn new(pulse_ms: u32) -> Self {
        Self { pulse_ms }
    }

    /// Hold time per phase in milliseconds
    #[inline]
    pub const fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Time one full step takes in milliseconds
    #[inline]
    pub const fn step_duration_ms(&self) -> u32 {
        self.pulse_ms.saturating_mul(PHASES_PER_STEP as u32)
    }

    /// Advance the motor one physical step
    ///
    /// Blocks for the whole step. Returns the time consumed in ms, always
    /// `4 * pulse_ms`.
    pub fn step<P, D>(&self, coils: &CoilMap, out: &mut P, delay: &mut D) -> u32
    where
        P: PortOutput + ?Sized,
        D: DelayNs + ?Sized,
    {
        let mut elapsed_ms = 0u32;
        let active = coils.active();

        for phase in PHASES.iter() {
            let pair = &active[phase.pair];
            pair[0].write(out, phase.levels[0]);
            pair[1].write(out, phase.levels[1]);

            delay.delay_ms(self.pulse_ms);
            elapsed_ms = elapsed_ms.saturating_add(self.pulse_ms);
        }

        elapsed_ms
    }

    /// Drive all four coil pins OFF
    pub fn disable<P>(&self, coils: &CoilMap, out: &mut P)
    where
        P: PortOutput + ?Sized,
    {
        for pair in coils.active() {
            for pin in pair {
                pin.write(out, Level::Low);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinRef;
    use crate::stepper::coil::CoilPins;
    use crate::testing::bench;
    use gnomon_hal::Level::{High, Low};
    use std::vec;

    const HAND: CoilPins = [
        [PinRef::a(3), PinRef::a(2)],
        [PinRef::a(1), PinRef::a(0)],
    ];

    const PITCH: CoilPins = [
        [PinRef::b(0), PinRef::b(1)],
        [PinRef::b(2), PinRef::a(7)],
    ];

    /// Expected writes for one step over a coil ordering
    fn expected_step(active: &CoilPins) -> std::vec::Vec<(PinRef, Level)> {
        vec![
            (active[0][0], High),
            (active[0][1], Low),
            (active[1][0], Low),
            (active[1][1], High),
            (active[0][0], Low),
            (active[0][1], High),
            (active[1][0], High),
            (active[1][1], Low),
        ]
    }

    #[test]
    fn test_phases_alternate_pairs() {
        // Pairs must alternate 0, 1, 0, 1; see the note on PHASES
        let pairs: [usize; PHASES_PER_STEP] = core::array::from_fn(|i| PHASES[i].pair);
        assert_eq!(pairs, [0, 1, 0, 1]);
        for (i, phase) in PHASES.iter().enumerate() {
            assert_eq!(phase.pair, i % 2);
        }
    }

    #[test]
    fn test_forward_step_sequence() {
        let (mut ports, mut delay) = bench();
        let seq = PhaseSequencer::default();
        let coils = CoilMap::new(HAND);

        let elapsed = seq.step(&coils, &mut ports, &mut delay);

        assert_eq!(elapsed, 12);
        assert_eq!(ports.levels_written(), expected_step(&HAND));
        assert_eq!(delay.waits_ms, vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_each_phase_holds_before_next() {
        let (mut ports, mut delay) = bench();
        let seq = PhaseSequencer::new(5);
        let coils = CoilMap::new(HAND);

        seq.step(&coils, &mut ports, &mut delay);

        // Two writes per phase, stamped at the start of that phase
        let stamps: std::vec::Vec<u64> = ports.writes.iter().map(|w| w.at_ms).collect();
        assert_eq!(stamps, vec![0, 0, 5, 5, 10, 10, 15, 15]);
        assert_eq!(delay.now_ms(), 20);
    }

    #[test]
    fn test_sequence_independent_of_motor() {
        let seq = PhaseSequencer::default();

        for wiring in [HAND, PITCH] {
            let (mut ports, mut delay) = bench();
            let coils = CoilMap::new(wiring);
            seq.step(&coils, &mut ports, &mut delay);
            assert_eq!(ports.levels_written(), expected_step(&wiring));
        }
    }

    #[test]
    fn test_reverse_step_swaps_pair_roles() {
        let (mut ports, mut delay) = bench();
        let seq = PhaseSequencer::default();
        let mut coils = CoilMap::new(HAND);
        coils.set_direction(-1);

        seq.step(&coils, &mut ports, &mut delay);

        let swapped = [HAND[1], HAND[0]];
        assert_eq!(ports.levels_written(), expected_step(&swapped));

        // Terminal order inside each pair is preserved
        let first = ports.writes[0];
        assert_eq!(first.pin, PinRef::a(1));
        assert_eq!(first.level, High);
    }

    #[test]
    fn test_step_leaves_final_phase_energized() {
        let (mut ports, mut delay) = bench();
        let seq = PhaseSequencer::default();
        let coils = CoilMap::new(HAND);

        seq.step(&coils, &mut ports, &mut delay);

        assert_eq!(ports.level(PinRef::a(3)), Low);
        assert_eq!(ports.level(PinRef::a(2)), High);
        assert_eq!(ports.level(PinRef::a(1)), High);
        assert_eq!(ports.level(PinRef::a(0)), Low);
    }

    #[test]
    fn test_disable_drives_all_low() {
        let seq = PhaseSequencer::default();

        for dir in [1, -1] {
            let (mut ports, _delay) = bench();
            ports.set_all_high();
            let mut coils = CoilMap::new(PITCH);
            coils.set_direction(dir);

            seq.disable(&coils, &mut ports);

            for pin in coils.pins() {
                assert_eq!(ports.level(pin), Low);
            }
            assert_eq!(ports.writes.len(), 4);
            // Pins outside the motor are not touched
            assert_eq!(ports.level(PinRef::a(0)), High);
        }
    }

    #[test]
    fn test_step_duration() {
        assert_eq!(PhaseSequencer::new(3).step_duration_ms(), 12);
        assert_eq!(PhaseSequencer::new(u32::MAX).step_duration_ms(), u32::MAX);
    }
}
