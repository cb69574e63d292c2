//! Transparent serial-to-stream bridge with a fixed client slot pool.
//!
//! [`SerialBridge`] mirrors one serial line to a small pool of byte-stream
//! clients: bytes a client sends go to the serial line in order; bytes the
//! serial line produces are broadcast to every connected client. There is
//! no framing and no backpressure beyond "available right now" - a blocked
//! client write may stall the tick, which is acceptable for low-rate debug
//! traffic.
//!
//! The pool is bounded: with all slots taken, a new connection is accepted
//! and immediately closed (graceful rejection). A slot whose client went
//! away is reclaimed lazily, when the next inbound connection scans the
//! pool.
//!
//! # Example
//!
//! ```rust
//! use garage_relay::SerialBridge;
//! use garage_relay::hal::{MockListener, MockSerial};
//!
//! let listener = MockListener::new();
//! let serial = MockSerial::new();
//! let mut bridge = SerialBridge::new(listener, serial, 1);
//!
//! bridge.tick().unwrap(); // nothing pending, nothing happens
//! assert_eq!(bridge.client_count(), 0);
//! ```

extern crate alloc;
use alloc::vec::Vec;

use crate::traits::{SerialPort, StreamConnection, StreamListener};

/// Per-tick transfer buffer size in bytes.
const CHUNK: usize = 512;

/// Bidirectional byte relay between one serial line and up to `max_clients`
/// stream clients.
///
/// Drive it by calling [`tick`](Self::tick) once per control-loop
/// iteration. Serial-line errors propagate to the caller; per-client errors
/// mark that client dead and its slot is reclaimed on a later tick.
pub struct SerialBridge<L: StreamListener, P: SerialPort> {
    listener: L,
    serial: P,
    slots: Vec<Option<L::Conn>>,
}

impl<L: StreamListener, P: SerialPort> SerialBridge<L, P> {
    /// Create a bridge with `max_clients` empty slots.
    pub fn new(listener: L, serial: P, max_clients: usize) -> Self {
        let mut slots = Vec::with_capacity(max_clients);
        slots.resize_with(max_clients, || None);
        Self {
            listener,
            serial,
            slots,
        }
    }

    /// Number of slots currently holding a live client.
    pub fn client_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Some(conn) if conn.is_open()))
            .count()
    }

    /// Total slot capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Borrow the serial port (for test inspection).
    pub fn serial(&self) -> &P {
        &self.serial
    }

    /// Mutably borrow the serial port (for scripting test input).
    pub fn serial_mut(&mut self) -> &mut P {
        &mut self.serial
    }

    /// Run one bridge iteration:
    ///
    /// 1. place a pending inbound connection into the first
    ///    free-or-disconnected slot (closing a stale occupant first), or
    ///    accept-then-close it when the pool is full;
    /// 2. drain each connected client's available bytes to the serial line,
    ///    preserving order;
    /// 3. read the serial line's available batch once and forward it
    ///    verbatim to every connected client, in slot order.
    ///
    /// Returns serial-line errors; client failures are handled internally
    /// by marking the client dead.
    pub fn tick(&mut self) -> Result<(), P::Error> {
        self.accept_pending();
        self.clients_to_serial()?;
        self.serial_to_clients()?;
        Ok(())
    }

    fn accept_pending(&mut self) {
        // Accept errors are transient; try again next tick.
        let Ok(Some(mut conn)) = self.listener.try_accept() else {
            return;
        };

        for slot in self.slots.iter_mut() {
            let free = match slot {
                None => true,
                Some(existing) => !existing.is_open(),
            };
            if free {
                // Close a stale occupant before reusing its slot.
                if let Some(mut stale) = slot.take() {
                    stale.close();
                }
                *slot = Some(conn);
                return;
            }
        }

        // Pool full: graceful rejection.
        conn.close();
    }

    fn clients_to_serial(&mut self) -> Result<(), P::Error> {
        let mut buf = [0u8; CHUNK];
        for slot in self.slots.iter_mut() {
            let Some(conn) = slot else { continue };
            if !conn.is_open() {
                continue;
            }
            loop {
                match conn.read_available(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => self.serial.write_all(&buf[..n])?,
                    Err(_) => {
                        conn.close();
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn serial_to_clients(&mut self) -> Result<(), P::Error> {
        let mut buf = [0u8; CHUNK];
        let n = self.serial.read_available(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        let batch = &buf[..n];
        for slot in self.slots.iter_mut() {
            let Some(conn) = slot else { continue };
            if !conn.is_open() {
                continue;
            }
            if conn.write_all(batch).is_err() {
                conn.close();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockListener, MockSerial};

    #[test]
    fn empty_tick_is_a_noop() {
        let mut bridge = SerialBridge::new(MockListener::new(), MockSerial::new(), 2);
        bridge.tick().unwrap();
        assert_eq!(bridge.client_count(), 0);
        assert!(bridge.serial().written().is_empty());
    }

    #[test]
    fn accepts_into_free_slot() {
        let listener = MockListener::new();
        let client = listener.enqueue_client();
        let mut bridge = SerialBridge::new(listener, MockSerial::new(), 1);

        bridge.tick().unwrap();

        assert_eq!(bridge.client_count(), 1);
        assert!(client.is_open());
    }

    #[test]
    fn rejects_when_pool_full() {
        let listener = MockListener::new();
        let first = listener.enqueue_client();
        let second = listener.enqueue_client();
        let mut bridge = SerialBridge::new(listener, MockSerial::new(), 1);

        bridge.tick().unwrap(); // seats first
        bridge.tick().unwrap(); // rejects second

        assert!(first.is_open());
        assert!(!second.is_open(), "overflow client must be closed");
        assert_eq!(bridge.client_count(), 1);
    }

    #[test]
    fn reclaims_stale_slot_on_next_accept() {
        let listener = MockListener::new();
        let first = listener.enqueue_client();
        let mut bridge = SerialBridge::new(listener, MockSerial::new(), 1);
        bridge.tick().unwrap();

        first.disconnect();
        let second = bridge_listener(&bridge).enqueue_client();
        bridge.tick().unwrap();

        assert!(second.is_open());
        assert_eq!(bridge.client_count(), 1);
    }

    // The listener handle is cloneable; grab it back out of the bridge via
    // a fresh handle to the same queue.
    fn bridge_listener(
        bridge: &SerialBridge<MockListener, MockSerial>,
    ) -> MockListener {
        bridge.listener.clone()
    }

    #[test]
    fn client_bytes_reach_serial_in_order() {
        let listener = MockListener::new();
        let client = listener.enqueue_client();
        let mut bridge = SerialBridge::new(listener, MockSerial::new(), 1);
        bridge.tick().unwrap();

        client.push_incoming(b"AB");
        client.push_incoming(b"C");
        bridge.tick().unwrap();

        assert_eq!(bridge.serial().written(), b"ABC");
    }

    #[test]
    fn serial_batch_broadcast_to_all_clients() {
        let listener = MockListener::new();
        let a = listener.enqueue_client();
        let b = listener.enqueue_client();
        let serial = MockSerial::new();
        let mut bridge = SerialBridge::new(listener, serial, 2);
        bridge.tick().unwrap();
        bridge.tick().unwrap();
        assert_eq!(bridge.client_count(), 2);

        bridge.serial.push_incoming(b"hello");
        bridge.tick().unwrap();

        assert_eq!(a.received(), b"hello");
        assert_eq!(b.received(), b"hello");
    }

    #[test]
    fn dead_client_skipped_on_broadcast() {
        let listener = MockListener::new();
        let a = listener.enqueue_client();
        let b = listener.enqueue_client();
        let mut bridge = SerialBridge::new(listener, MockSerial::new(), 2);
        bridge.tick().unwrap();
        bridge.tick().unwrap();

        a.disconnect();
        bridge.serial.push_incoming(b"x");
        bridge.tick().unwrap();

        assert!(a.received().is_empty());
        assert_eq!(b.received(), b"x");
    }
}
