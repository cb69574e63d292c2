//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and network traits,
//! enabling development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRelay`] | [`RelayOutput`] | Tracks relay levels and writes |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDelay`] | [`Delay`] | Records backoff sleeps |
//! | [`MockMqtt`] | [`MqttClient`] | Captures pub/sub operations in order |
//! | [`MockSerial`] | [`SerialPort`] | Scriptable serial line |
//! | [`MockListener`] | [`StreamListener`] | Scriptable inbound connections |
//! | [`MockStream`] | [`StreamConnection`] | Inspectable stream client |
//!
//! The stream mocks hand out shared handles: the same [`MockStream`] can be
//! owned by the bridge's slot pool and inspected from the test after the
//! fact.
//!
//! # Example
//!
//! ```rust
//! use garage_relay::{Door, DoorController};
//! use garage_relay::hal::MockRelay;
//!
//! let mut controller = DoorController::new(MockRelay::new(), 2000);
//! controller.press(Door::Left, 0).unwrap();
//! assert!(controller.relay().level(Door::Left));
//! ```
//!
//! [`RelayOutput`]: crate::traits::RelayOutput
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay
//! [`MqttClient`]: crate::traits::MqttClient
//! [`SerialPort`]: crate::traits::SerialPort
//! [`StreamListener`]: crate::traits::StreamListener
//! [`StreamConnection`]: crate::traits::StreamConnection

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::traits::{
    Clock, Delay, Door, MqttClient, MqttMessage, RelayOutput, SerialPort, StreamConnection,
    StreamListener, DOOR_COUNT,
};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock relay driver for testing.
///
/// Records the current level of both outputs and every write performed.
///
/// # Example
///
/// ```rust
/// use garage_relay::hal::MockRelay;
/// use garage_relay::traits::{RelayOutput, Door};
///
/// let mut relay = MockRelay::new();
/// relay.set_level(Door::Right, true).unwrap();
///
/// assert!(relay.level(Door::Right));
/// assert_eq!(relay.write_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRelay {
    /// Current level of each output, indexed by [`Door::index`].
    pub levels: [bool; DOOR_COUNT],
    /// Every write performed, in order.
    pub writes: Vec<(Door, bool)>,
    /// Number of hardware writes performed.
    pub write_count: usize,
}

impl MockRelay {
    /// Creates a mock relay with both outputs open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of one output.
    pub fn level(&self, door: Door) -> bool {
        self.levels[door.index()]
    }
}

impl RelayOutput for MockRelay {
    type Error = ();

    fn set_level(&mut self, door: Door, pressed: bool) -> Result<(), ()> {
        self.levels[door.index()] = pressed;
        self.writes.push((door, pressed));
        self.write_count += 1;
        Ok(())
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use garage_relay::hal::MockClock;
/// use garage_relay::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

/// Mock delay that records every sleep instead of blocking.
///
/// Lets tests assert the reconnect backoff without waiting for it.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Requested sleep durations, in call order.
    pub sleeps: Vec<u32>,
}

impl MockDelay {
    /// Creates a new mock delay with no recorded sleeps.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Delay for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// One recorded MQTT client operation, for ordering assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockOp {
    /// A publish to the given topic.
    Publish(String),
    /// A subscribe to the given topic.
    Subscribe(String),
}

/// Mock MQTT client for testing.
///
/// Records all publish/subscribe operations (individually and as an ordered
/// [`history`](Self::history)) and allows injecting incoming messages and
/// connection failures.
///
/// # Example
///
/// ```rust
/// use garage_relay::hal::MockMqtt;
/// use garage_relay::traits::MqttClient;
///
/// let mut mqtt = MockMqtt::new();
/// mqtt.queue_message("garage/left_door/switch/set", b"1".to_vec());
///
/// let msg = mqtt.try_recv().unwrap();
/// assert_eq!(msg.payload, b"1");
/// ```
#[derive(Debug, Default)]
pub struct MockMqtt {
    /// Messages that have been published (topic, payload, retain).
    pub published: Vec<(String, Vec<u8>, bool)>,
    /// Topics that have been subscribed to.
    pub subscriptions: Vec<String>,
    /// Ordered log of publish/subscribe operations.
    pub history: Vec<MockOp>,
    /// Queue of incoming messages to be returned by `try_recv()`.
    pub incoming: Vec<MqttMessage>,
    /// Whether the client is connected.
    pub connected: bool,
    /// Number of upcoming `reconnect()` calls that should fail.
    pub fail_reconnects: u32,
}

impl MockMqtt {
    /// Creates a new mock MQTT client in connected state.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Queue an incoming message
    pub fn queue_message(&mut self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.incoming.push(MqttMessage {
            topic: topic.into(),
            payload: payload.into(),
        });
    }

    /// Check if a topic was subscribed to
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.iter().any(|t| t == topic)
    }

    /// Get published messages for a topic
    pub fn published_to(&self, topic: &str) -> Vec<&(String, Vec<u8>, bool)> {
        self.published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .collect()
    }
}

impl MqttClient for MockMqtt {
    type Error = ();

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), ()> {
        self.history.push(MockOp::Publish(topic.into()));
        self.published
            .push((topic.into(), payload.to_vec(), retain));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
        self.history.push(MockOp::Subscribe(topic.into()));
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        if self.incoming.is_empty() {
            None
        } else {
            Some(self.incoming.remove(0))
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reconnect(&mut self) -> Result<(), ()> {
        if self.fail_reconnects > 0 {
            self.fail_reconnects -= 1;
            Err(())
        } else {
            self.connected = true;
            Ok(())
        }
    }
}

// ============================================================================
// Serial / Stream Mocks
// ============================================================================

/// Mock serial line with scriptable input and captured output.
#[derive(Debug, Default)]
pub struct MockSerial {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
}

impl MockSerial {
    /// Creates a mock serial line with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available for the next `read_available` calls.
    pub fn push_incoming(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().copied());
    }

    /// Everything written to the line so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }
}

impl SerialPort for MockSerial {
    type Error = ();

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let n = buf.len().min(self.incoming.len());
        for slot in buf.iter_mut().take(n) {
            // n is bounded by the queue length, pop cannot fail.
            *slot = self.incoming.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StreamInner {
    open: bool,
    incoming: VecDeque<u8>,
    received: Vec<u8>,
}

/// Mock byte-stream client, handed out as a shared handle.
///
/// Cloning yields another handle to the same client, so tests keep one
/// while the bridge's slot pool owns the other.
#[derive(Clone, Debug)]
pub struct MockStream {
    inner: Rc<RefCell<StreamInner>>,
}

impl MockStream {
    /// Creates a connected mock stream.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StreamInner {
                open: true,
                ..Default::default()
            })),
        }
    }

    /// Simulate the peer hanging up.
    pub fn disconnect(&self) {
        self.inner.borrow_mut().open = false;
    }

    /// Make bytes available as if the peer sent them.
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.inner
            .borrow_mut()
            .incoming
            .extend(bytes.iter().copied());
    }

    /// Everything delivered to this client so far.
    pub fn received(&self) -> Vec<u8> {
        self.inner.borrow().received.clone()
    }

    /// Whether the stream is still open.
    pub fn is_open(&self) -> bool {
        self.inner.borrow().open
    }
}

impl StreamConnection for MockStream {
    type Error = ();

    fn is_open(&self) -> bool {
        MockStream::is_open(self)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let mut inner = self.inner.borrow_mut();
        if !inner.open {
            return Err(());
        }
        let n = buf.len().min(inner.incoming.len());
        for slot in buf.iter_mut().take(n) {
            *slot = inner.incoming.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        let mut inner = self.inner.borrow_mut();
        if !inner.open {
            return Err(());
        }
        inner.received.extend_from_slice(bytes);
        Ok(())
    }

    fn close(&mut self) {
        self.inner.borrow_mut().open = false;
    }
}

/// Mock listener with a scriptable queue of pending connections.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Debug, Default)]
pub struct MockListener {
    pending: Rc<RefCell<VecDeque<MockStream>>>,
}

impl MockListener {
    /// Creates a listener with no pending connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new inbound client; the returned handle stays valid for
    /// inspection after the bridge seats (or rejects) it.
    pub fn enqueue_client(&self) -> MockStream {
        let stream = MockStream::new();
        self.pending.borrow_mut().push_back(stream.clone());
        stream
    }

    /// Number of connections still waiting to be accepted.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl StreamListener for MockListener {
    type Conn = MockStream;
    type Error = ();

    fn try_accept(&mut self) -> Result<Option<MockStream>, ()> {
        Ok(self.pending.borrow_mut().pop_front())
    }
}

// ============================================================================
// Tests
// ============================================================================
