//! Switch actuator: the in-memory switch states and the relay levels.
//!
//! [`SwitchBank`] owns the logical `pressed` state of both doors and pushes
//! every change to the [`RelayOutput`] hardware synchronously. It is the
//! only writer of the relay levels.

use crate::traits::{Door, RelayOutput, DOOR_COUNT};

/// The two momentary switch states plus the relay driver.
///
/// Both switches start released. `set_pressed` is idempotent: setting the
/// current value again still performs the hardware write (re-driving a pin
/// to its level is harmless) and is not an error.
pub struct SwitchBank<R: RelayOutput> {
    relay: R,
    pressed: [bool; DOOR_COUNT],
}

impl<R: RelayOutput> SwitchBank<R> {
    /// Create a switch bank with both switches released.
    ///
    /// Does not touch the hardware; drive the outputs low during bring-up
    /// (see [`RelayOutput::release_all`]) before constructing.
    pub fn new(relay: R) -> Self {
        Self {
            relay,
            pressed: [false; DOOR_COUNT],
        }
    }

    /// Set one switch's state and drive the corresponding relay level.
    pub fn set_pressed(&mut self, door: Door, pressed: bool) -> Result<(), R::Error> {
        self.pressed[door.index()] = pressed;
        self.relay.set_level(door, pressed)
    }

    /// Current logical state of one switch.
    #[inline]
    pub fn is_pressed(&self, door: Door) -> bool {
        self.pressed[door.index()]
    }

    /// Borrow the relay driver (for test inspection).
    pub fn relay(&self) -> &R {
        &self.relay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockRelay;

    #[test]
    fn starts_released() {
        let bank = SwitchBank::new(MockRelay::new());
        assert!(!bank.is_pressed(Door::Left));
        assert!(!bank.is_pressed(Door::Right));
    }

    #[test]
    fn set_pressed_drives_relay() {
        let mut bank = SwitchBank::new(MockRelay::new());

        bank.set_pressed(Door::Left, true).unwrap();
        assert!(bank.is_pressed(Door::Left));
        assert!(bank.relay().level(Door::Left));
        assert!(!bank.relay().level(Door::Right));

        bank.set_pressed(Door::Left, false).unwrap();
        assert!(!bank.is_pressed(Door::Left));
        assert!(!bank.relay().level(Door::Left));
    }

    #[test]
    fn doors_are_independent() {
        let mut bank = SwitchBank::new(MockRelay::new());

        bank.set_pressed(Door::Right, true).unwrap();
        assert!(!bank.is_pressed(Door::Left));
        assert!(bank.is_pressed(Door::Right));
    }

    #[test]
    fn set_pressed_is_idempotent_but_still_writes() {
        let mut bank = SwitchBank::new(MockRelay::new());

        bank.set_pressed(Door::Left, true).unwrap();
        bank.set_pressed(Door::Left, true).unwrap();

        assert!(bank.is_pressed(Door::Left));
        // Both calls reach the hardware.
        assert_eq!(bank.relay().write_count, 2);
    }
}
