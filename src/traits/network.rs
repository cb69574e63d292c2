//! Network abstraction traits for MQTT and the stream bridge.
//!
//! This module defines traits for network connectivity, enabling the door
//! controller to be commanded remotely via MQTT pub/sub and the console
//! UART to be mirrored to TCP clients.
//!
//! # Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`MqttClient`] | Pub/sub messaging for home automation |
//! | [`StreamListener`] | Accepts inbound byte-stream clients |
//! | [`StreamConnection`] | One accepted byte-stream client |
//!
//! # MQTT Integration
//!
//! MQTT is ideal for integration with home automation systems like
//! Home Assistant or Node-RED:
//!
//! ```text
//! home/main_floor/garage/left_door/switch/set     - press command ("1")
//! home/main_floor/garage/left_door/switch/status  - switch state ("1"/"0", retained)
//! home/main_floor/garage/right_door/switch/set    - press command ("1")
//! home/main_floor/garage/right_door/switch/status - switch state ("1"/"0", retained)
//! ```

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

// ============================================================================
// MQTT Client Trait (Sync-First Design)
// ============================================================================

/// MQTT client trait for pub/sub messaging.
///
/// This trait uses a **sync-first design** that works on both ESP32
/// (blocking I/O) and desktop. The implementation may run an internal event
/// thread, but delivers inbound messages only through [`try_recv`], keeping
/// all state mutation on the single control-loop thread.
///
/// # Implementation Notes
///
/// - `publish` and `subscribe` are synchronous (blocking on ESP32)
/// - `try_recv` is non-blocking for polling patterns
/// - `reconnect` makes one synchronous (re)connection attempt; the channel
///   layer owns the retry/backoff policy around it
///
/// [`try_recv`]: MqttClient::try_recv
pub trait MqttClient {
    /// Error type for MQTT operations.
    type Error;

    /// Publish a message to a topic (blocking).
    ///
    /// # Arguments
    /// - `topic`: MQTT topic path
    /// - `payload`: Message bytes
    /// - `retain`: If true, broker keeps message for new subscribers
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Subscribe to a topic (blocking).
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Try to receive the next message (non-blocking).
    ///
    /// Returns `None` if no message is available. This should never block.
    fn try_recv(&mut self) -> Option<MqttMessage>;

    /// Check if connected to broker.
    fn is_connected(&self) -> bool;

    /// Make one synchronous connection attempt.
    ///
    /// Returns `Ok(())` once the session is live again. Implementations
    /// whose transport reconnects internally may simply verify liveness
    /// here. Must not loop; the caller applies backoff between attempts.
    fn reconnect(&mut self) -> Result<(), Self::Error>;
}

/// An MQTT message received from a subscription.
///
/// Contains the topic and payload of a published message.
#[derive(Clone, Debug)]
pub struct MqttMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Message payload as raw bytes.
    pub payload: Vec<u8>,
}

impl MqttMessage {
    /// Create a new MQTT message.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Returns the payload as a UTF-8 string, if valid.
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

// ============================================================================
// Stream Bridge Traits
// ============================================================================

/// One byte-stream client held by the bridge slot pool.
///
/// The bridge treats a connection as a transparent byte pipe: reads are
/// non-blocking (whatever is available right now), writes deliver the whole
/// buffer. A connection that reports `is_open() == false` occupies a stale
/// slot until the pool reclaims it.
pub trait StreamConnection {
    /// Error type for stream operations.
    type Error;

    /// True while the peer is still connected.
    fn is_open(&self) -> bool;

    /// Read currently-available bytes into `buf`, returning how many were
    /// read. `Ok(0)` means nothing pending; never blocks.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `bytes` to the client.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Close the connection. Further reads/writes are undefined; `is_open`
    /// must return false afterwards.
    fn close(&mut self);
}

/// Accepts inbound byte-stream clients for the bridge.
///
/// `try_accept` is polled once per bridge tick and must not block.
pub trait StreamListener {
    /// Connection type handed to the slot pool.
    type Conn: StreamConnection;
    /// Error type for accept operations.
    type Error;

    /// Accept one pending connection, if any. Never blocks.
    fn try_accept(&mut self) -> Result<Option<Self::Conn>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_new() {
        let msg = MqttMessage::new("garage/test", b"1".to_vec());
        assert_eq!(msg.topic, "garage/test");
        assert_eq!(msg.payload, b"1");
    }

    #[test]
    fn message_payload_str() {
        let msg = MqttMessage::new("t", b"hello".to_vec());
        assert_eq!(msg.payload_str(), Some("hello"));
    }

    #[test]
    fn message_payload_str_invalid_utf8() {
        let msg = MqttMessage::new("t", alloc::vec![0xFF, 0xFE]);
        assert_eq!(msg.payload_str(), None);
    }
}
