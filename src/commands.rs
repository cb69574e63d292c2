//! Command types and wire payloads for the door switch protocol.
//!
//! The protocol is deliberately small: one command topic and one status
//! topic per door. A press command is the payload `"1"` on a door's command
//! topic; everything else is ignored. Status is `"1"` (pressed) or `"0"`
//! (released), published retained so late subscribers see the last state.
//!
//! There is no release-by-command path; release happens only through the
//! auto-release timer.

use crate::traits::Door;

/// Payload that triggers a press, and the pressed status value.
pub const PAYLOAD_PRESSED: &str = "1";

/// Released status value.
pub const PAYLOAD_RELEASED: &str = "0";

/// Topic suffix (below the per-door segment) for command topics.
pub const COMMAND_SUFFIX: &str = "switch/set";

/// Topic suffix (below the per-door segment) for status topics.
pub const STATUS_SUFFIX: &str = "switch/status";

/// A command received over the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorCommand {
    /// Momentary press: close the door's relay contact and start the
    /// auto-release window. Always re-triggers, even mid-pulse.
    Press(Door),
}

/// Parse a message on a door-relative topic suffix into a command.
///
/// `suffix` is the topic with the configured prefix already stripped, e.g.
/// `left_door/switch/set`. Returns `None` for unknown topics and for any
/// payload other than `"1"` (unrecognized payloads are silently ignored,
/// per the wire contract).
///
/// # Examples
///
/// ```
/// use garage_relay::{commands::parse_command, Door, DoorCommand};
///
/// assert_eq!(
///     parse_command("left_door/switch/set", b"1"),
///     Some(DoorCommand::Press(Door::Left))
/// );
/// assert_eq!(parse_command("left_door/switch/set", b"0"), None);
/// assert_eq!(parse_command("left_door/switch/status", b"1"), None);
/// ```
pub fn parse_command(suffix: &str, payload: &[u8]) -> Option<DoorCommand> {
    let door = Door::ALL
        .into_iter()
        .find(|door| {
            suffix
                .strip_prefix(door.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|rest| rest == COMMAND_SUFFIX)
        })?;

    if payload == PAYLOAD_PRESSED.as_bytes() {
        Some(DoorCommand::Press(door))
    } else {
        None
    }
}

/// Status payload for a switch state.
#[inline]
pub const fn status_payload(pressed: bool) -> &'static str {
    if pressed {
        PAYLOAD_PRESSED
    } else {
        PAYLOAD_RELEASED
    }
}
