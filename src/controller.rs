//! Main door controller that ties the switch bank and timers together.
//!
//! This module provides [`DoorController`], the central component that
//! coordinates press commands, the auto-release timers, and the relay
//! hardware.
//!
//! # Overview
//!
//! The controller:
//! - Accepts press commands and closes the corresponding relay contact
//! - Arms one auto-release timer per door (cancel-and-replace on re-press)
//! - Releases fired doors on each tick
//! - Provides state snapshots for status publishing
//!
//! # Example
//!
//! ```rust
//! use garage_relay::{Door, DoorController, hal::MockRelay};
//!
//! let mut controller = DoorController::new(MockRelay::new(), 2000);
//!
//! controller.press(Door::Left, 0).unwrap();
//! assert!(controller.is_pressed(Door::Left));
//!
//! // Main loop - call tick() every iteration with the current time
//! let released = controller.tick(2000).unwrap();
//! assert_eq!(released.as_slice(), &[Door::Left]);
//! assert!(!controller.is_pressed(Door::Left));
//! ```

use heapless::Vec as HVec;

use crate::switch::SwitchBank;
use crate::timer::AutoReleaseTimer;
use crate::traits::{Door, RelayOutput, DOOR_COUNT};

/// Main door controller.
///
/// Owns the [`SwitchBank`] and one [`AutoReleaseTimer`] per door. Each door
/// has its own timer, so a press on one door never disturbs the other
/// door's pending release.
///
/// # Thread Safety
///
/// The controller is not thread-safe; the design assumes a single-threaded
/// cooperative loop where all mutation happens between iterations. If
/// separate I/O tasks are ever introduced, funnel every press/tick through
/// one serialization point to preserve the at-most-one-pending-release
/// invariant per door.
pub struct DoorController<R: RelayOutput> {
    switches: SwitchBank<R>,
    timers: [AutoReleaseTimer; DOOR_COUNT],
    pulse_ms: u32,
}

/// Snapshot of both switch states, for status publishing and UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchSnapshot {
    /// Left door pressed state.
    pub left: bool,
    /// Right door pressed state.
    pub right: bool,
}

impl SwitchSnapshot {
    /// State of one door.
    #[inline]
    pub fn door(&self, door: Door) -> bool {
        match door {
            Door::Left => self.left,
            Door::Right => self.right,
        }
    }
}

impl<R: RelayOutput> DoorController<R> {
    /// Create a controller with both switches released.
    ///
    /// `pulse_ms` is the width of the momentary press window, identical for
    /// both doors.
    pub fn new(relay: R, pulse_ms: u32) -> Self {
        Self {
            switches: SwitchBank::new(relay),
            timers: [AutoReleaseTimer::new(); DOOR_COUNT],
            pulse_ms,
        }
    }

    /// Handle a press command: close the contact and (re)start the
    /// auto-release window.
    ///
    /// A press while already mid-pulse re-triggers: the state is re-driven
    /// and the timer deadline replaced, restarting the full pulse width.
    pub fn press(&mut self, door: Door, now_ms: u64) -> Result<(), R::Error> {
        self.switches.set_pressed(door, true)?;
        self.timers[door.index()].arm(now_ms, self.pulse_ms);
        Ok(())
    }

    /// Explicitly release a door, discarding any pending auto-release.
    ///
    /// The timer is cancelled first so the release cannot run twice.
    pub fn release(&mut self, door: Door) -> Result<(), R::Error> {
        self.timers[door.index()].cancel();
        self.switches.set_pressed(door, false)
    }

    /// Due-check both timers and release any door whose window expired.
    ///
    /// Returns the doors released this tick (in [`Door::ALL`] order) so the
    /// caller can publish their new state. Each timer fires at most once
    /// per arm.
    pub fn tick(&mut self, now_ms: u64) -> Result<HVec<Door, DOOR_COUNT>, R::Error> {
        let mut released = HVec::new();
        for door in Door::ALL {
            if self.timers[door.index()].poll(now_ms) {
                self.switches.set_pressed(door, false)?;
                // Capacity equals DOOR_COUNT, push cannot fail.
                let _ = released.push(door);
            }
        }
        Ok(released)
    }

    /// Current logical state of one switch.
    #[inline]
    pub fn is_pressed(&self, door: Door) -> bool {
        self.switches.is_pressed(door)
    }

    /// Snapshot of both switch states.
    pub fn snapshot(&self) -> SwitchSnapshot {
        SwitchSnapshot {
            left: self.switches.is_pressed(Door::Left),
            right: self.switches.is_pressed(Door::Right),
        }
    }

    /// Whether a door's auto-release is pending.
    pub fn is_armed(&self, door: Door) -> bool {
        self.timers[door.index()].is_armed()
    }

    /// The configured pulse width in milliseconds.
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Borrow the relay driver (for test inspection).
    pub fn relay(&self) -> &R {
        self.switches.relay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockRelay;

    fn controller() -> DoorController<MockRelay> {
        DoorController::new(MockRelay::new(), 2000)
    }

    #[test]
    fn press_arms_and_drives() {
        let mut c = controller();
        c.press(Door::Left, 100).unwrap();

        assert!(c.is_pressed(Door::Left));
        assert!(c.is_armed(Door::Left));
        assert!(!c.is_armed(Door::Right));
    }

    #[test]
    fn tick_before_deadline_releases_nothing() {
        let mut c = controller();
        c.press(Door::Left, 0).unwrap();

        let released = c.tick(1999).unwrap();
        assert!(released.is_empty());
        assert!(c.is_pressed(Door::Left));
    }

    #[test]
    fn both_doors_release_in_one_tick() {
        let mut c = controller();
        c.press(Door::Left, 0).unwrap();
        c.press(Door::Right, 10).unwrap();

        let released = c.tick(5000).unwrap();
        assert_eq!(released.as_slice(), &[Door::Left, Door::Right]);
        assert_eq!(c.snapshot(), SwitchSnapshot::default());
    }

    #[test]
    fn right_press_does_not_disturb_left_release() {
        // Two independent timers: pressing right mid-left-pulse must not
        // move the left deadline.
        let mut c = controller();
        c.press(Door::Left, 0).unwrap();
        c.press(Door::Right, 1500).unwrap();

        let released = c.tick(2000).unwrap();
        assert_eq!(released.as_slice(), &[Door::Left]);
        assert!(c.is_pressed(Door::Right));

        let released = c.tick(3500).unwrap();
        assert_eq!(released.as_slice(), &[Door::Right]);
    }

    #[test]
    fn explicit_release_cancels_timer() {
        let mut c = controller();
        c.press(Door::Left, 0).unwrap();
        c.release(Door::Left).unwrap();

        assert!(!c.is_pressed(Door::Left));
        assert!(!c.is_armed(Door::Left));
        // The cancelled timer must not fire a second release.
        assert!(c.tick(10_000).unwrap().is_empty());
    }
}
