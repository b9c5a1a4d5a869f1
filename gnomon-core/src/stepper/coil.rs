//! Coil map and direction selection
//!
//! A stepper has two coil pairs, each driven through two terminal pins.
//! The phase sequencer always energizes "pair 0" then "pair 1" of the
//! *active* configuration; reversing the motor is done by swapping which
//! physical pair plays each role, which inverts the rotating field.

use crate::pin::PinRef;

/// 2 coil pairs x 2 terminals
pub type CoilPins = [[PinRef; 2]; 2];

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Coil pairs in wiring order
    #[default]
    Forward,
    /// Coil pairs swapped
    Reverse,
}

impl Direction {
    /// Resolve a direction from the sign of a step delta
    ///
    /// Negative deltas run in reverse; zero and positive run forward.
    #[inline]
    pub const fn from_delta(delta: i16) -> Self {
        if delta < 0 {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Get the opposite direction
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Per-motor coil wiring plus its direction-resolved active ordering
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoilMap {
    coils: CoilPins,
    active: CoilPins,
    direction: Direction,
}

impl CoilMap {
    /// Create a coil map from the wiring
    ///
    /// The active configuration starts out forward, so a motor that has
    /// never had its direction set still steps in a defined direction.
    pub const fn new(coils: CoilPins) -> Self {
        Self {
            coils,
            active: coils,
            direction: Direction::Forward,
        }
    }

    /// Select the active ordering for a signed step delta
    ///
    /// `dir < 0` selects reverse, anything else forward. Only the pin
    /// ordering changes; no pin is written.
    pub fn set_direction(&mut self, dir: i16) {
        self.select(Direction::from_delta(dir));
    }

    /// Select the active ordering for a direction
    pub fn select(&mut self, direction: Direction) {
        self.active = match direction {
            Direction::Forward => self.coils,
            Direction::Reverse => [self.coils[1], self.coils[0]],
        };
        self.direction = direction;
    }

    /// Wiring-order coil pins
    #[inline]
    pub fn coils(&self) -> &CoilPins {
        &self.coils
    }

    /// Direction-resolved coil pins used for stepping
    #[inline]
    pub fn active(&self) -> &CoilPins {
        &self.active
    }

    /// Currently selected direction
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// All four pins in wiring order
    pub fn pins(&self) -> impl Iterator<Item = PinRef> + '_ {
        self.coils.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hand_coils() -> CoilPins {
        [
            [PinRef::a(3), PinRef::a(2)],
            [PinRef::a(1), PinRef::a(0)],
        ]
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(-1), Direction::Reverse);
        assert_eq!(Direction::from_delta(i16::MIN), Direction::Reverse);
        assert_eq!(Direction::from_delta(0), Direction::Forward);
        assert_eq!(Direction::from_delta(5), Direction::Forward);
        assert_eq!(Direction::Forward.opposite(), Direction::Reverse);
    }

    #[test]
    fn test_new_is_forward() {
        let map = CoilMap::new(hand_coils());
        assert_eq!(map.direction(), Direction::Forward);
        assert_eq!(map.active(), map.coils());
    }

    #[test]
    fn test_reverse_swaps_pairs_not_terminals() {
        let mut map = CoilMap::new(hand_coils());
        map.set_direction(-1);

        assert_eq!(map.direction(), Direction::Reverse);
        assert_eq!(map.active()[0], [PinRef::a(1), PinRef::a(0)]);
        assert_eq!(map.active()[1], [PinRef::a(3), PinRef::a(2)]);
        // Wiring is untouched
        assert_eq!(map.coils(), &hand_coils());
    }

    #[test]
    fn test_set_direction_is_idempotent() {
        let mut map = CoilMap::new(hand_coils());
        map.set_direction(-3);
        let once = map.clone();
        map.set_direction(-100);
        assert_eq!(map, once);
    }

    #[test]
    fn test_pins_in_wiring_order() {
        let mut map = CoilMap::new(hand_coils());
        map.set_direction(-1);
        let mut pins = map.pins();
        assert_eq!(pins.next(), Some(PinRef::a(3)));
        assert_eq!(pins.next(), Some(PinRef::a(2)));
        assert_eq!(pins.next(), Some(PinRef::a(1)));
        assert_eq!(pins.next(), Some(PinRef::a(0)));
        assert_eq!(pins.next(), None);
    }

    proptest! {
        #[test]
        fn prop_direction_toggle_round_trips(
            first in any::<i16>(),
            second in any::<i16>(),
            bits in proptest::array::uniform4(0u8..8),
        ) {
            let coils = [
                [PinRef::a(bits[0]), PinRef::b(bits[1])],
                [PinRef::b(bits[2]), PinRef::a(bits[3])],
            ];
            let mut map = CoilMap::new(coils);
            map.set_direction(first);
            map.set_direction(second);
            map.set_direction(0);
            prop_assert_eq!(map.active(), &coils);
        }

        #[test]
        fn prop_active_is_a_pair_permutation(dir in any::<i16>()) {
            let mut map = CoilMap::new(hand_coils());
            map.set_direction(dir);
            let active = *map.active();
            let coils = hand_coils();
            prop_assert!(active == coils || active == [coils[1], coils[0]]);
        }
    }
}
