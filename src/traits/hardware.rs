//! Hardware abstraction traits for relay output, timing, and the serial line.
//!
//! This module defines the hardware interfaces that allow garage-relay to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RelayOutput`] | Drives the two door relay outputs |
//! | [`Clock`] | Monotonic time source for the auto-release timers |
//! | [`Delay`] | Blocking millisecond sleep (reconnect backoff) |
//! | [`SerialPort`] | Byte-level access to the console UART |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use garage_relay::traits::{RelayOutput, Door};
//! use garage_relay::hal::MockRelay;
//!
//! let mut relay = MockRelay::new();
//! relay.set_level(Door::Left, true).unwrap();
//! assert!(relay.level(Door::Left));
//! ```

/// One of the two garage doors.
///
/// Indexes the relay outputs, the auto-release timers, and the MQTT topic
/// pair for that door.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Door {
    /// Left door relay.
    Left,
    /// Right door relay.
    Right,
}

/// Number of doors (and relay outputs, and timers).
pub const DOOR_COUNT: usize = 2;

impl Door {
    /// Both doors in a fixed order, for iteration.
    pub const ALL: [Door; DOOR_COUNT] = [Door::Left, Door::Right];

    /// Returns the topic segment for this door.
    ///
    /// # Examples
    ///
    /// ```
    /// use garage_relay::Door;
    ///
    /// assert_eq!(Door::Left.as_str(), "left_door");
    /// assert_eq!(Door::Right.as_str(), "right_door");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Door::Left => "left_door",
            Door::Right => "right_door",
        }
    }

    /// Stable index for per-door storage.
    #[inline]
    pub const fn index(&self) -> usize {
        match self {
            Door::Left => 0,
            Door::Right => 1,
        }
    }
}

/// Relay output trait - abstracts the two momentary switch outputs.
///
/// Implement this trait for your relay driver hardware. A level of `true`
/// closes the relay contact (button pressed); `false` opens it.
///
/// # Implementation Notes
///
/// - Re-driving a pin to its current level must be harmless; callers rely
///   on idempotent writes.
/// - Both outputs should rest open (`false`) before the controller starts.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use garage_relay::traits::{RelayOutput, Door};
///
/// struct MyRelay { /* pin handles */ }
///
/// impl RelayOutput for MyRelay {
///     type Error = ();
///
///     fn set_level(&mut self, door: Door, pressed: bool) -> Result<(), ()> {
///         // Drive the GPIO pin high or low...
///         Ok(())
///     }
/// }
/// ```
pub trait RelayOutput {
    /// Error type for relay operations.
    type Error;

    /// Drive one door's output: `true` = contact closed (pressed),
    /// `false` = contact open (released).
    fn set_level(&mut self, door: Door, pressed: bool) -> Result<(), Self::Error>;

    /// Convenience method to open both contacts.
    fn release_all(&mut self) -> Result<(), Self::Error> {
        for door in Door::ALL {
            self.set_level(door, false)?;
        }
        Ok(())
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for the auto-release timers.
/// On desktop, this can wrap `std::time::Instant`. On embedded, use a
/// hardware timer.
///
/// # Example
///
/// ```rust
/// use garage_relay::traits::Clock;
/// use garage_relay::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Blocking delay trait.
///
/// Used by the channel reconnect loop for its fixed backoff wait. This is
/// the one place the control loop blocks; see
/// [`DoorChannel::ensure_connected`](crate::services::channel::DoorChannel::ensure_connected).
pub trait Delay {
    /// Sleep for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Serial line trait for the console bridge.
///
/// Reads are non-blocking: `read_available` returns however many bytes are
/// ready right now (possibly zero). Writes push the whole buffer out.
pub trait SerialPort {
    /// Error type for serial operations.
    type Error;

    /// Read currently-available bytes into `buf`, returning how many were
    /// read. Returns `Ok(0)` when nothing is pending; never blocks.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `bytes` to the line, preserving order.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_as_str() {
        assert_eq!(Door::Left.as_str(), "left_door");
        assert_eq!(Door::Right.as_str(), "right_door");
    }

    #[test]
    fn door_index_is_stable() {
        assert_eq!(Door::Left.index(), 0);
        assert_eq!(Door::Right.index(), 1);
        for (i, door) in Door::ALL.iter().enumerate() {
            assert_eq!(door.index(), i);
        }
    }

    #[test]
    fn door_equality() {
        assert_eq!(Door::Left, Door::Left);
        assert_ne!(Door::Left, Door::Right);
    }

    // =========================================================================
    // RelayOutput default methods
    // =========================================================================

    struct TestRelay {
        levels: [bool; DOOR_COUNT],
        writes: usize,
    }

    impl RelayOutput for TestRelay {
        type Error = ();

        fn set_level(&mut self, door: Door, pressed: bool) -> Result<(), ()> {
            self.levels[door.index()] = pressed;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn relay_release_all_default_impl() {
        let mut relay = TestRelay {
            levels: [true, true],
            writes: 0,
        };

        relay.release_all().unwrap();

        assert_eq!(relay.levels, [false, false]);
        assert_eq!(relay.writes, 2);
    }
}
