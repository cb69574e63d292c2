//! Integration tests for the serial-to-stream bridge slot pool and relay
//! semantics.

use garage_relay::hal::{MockListener, MockSerial, MockStream};
use garage_relay::SerialBridge;

fn bridge_with(
    max_clients: usize,
) -> (SerialBridge<MockListener, MockSerial>, MockListener) {
    let listener = MockListener::new();
    let handle = listener.clone();
    (
        SerialBridge::new(listener, MockSerial::new(), max_clients),
        handle,
    )
}

fn seat(bridge: &mut SerialBridge<MockListener, MockSerial>, listener: &MockListener) -> MockStream {
    let client = listener.enqueue_client();
    bridge.tick().unwrap();
    client
}

#[test]
fn pool_bound_rejects_the_extra_client() {
    let (mut bridge, listener) = bridge_with(2);

    let a = seat(&mut bridge, &listener);
    let b = seat(&mut bridge, &listener);
    let c = seat(&mut bridge, &listener);

    assert!(a.is_open());
    assert!(b.is_open());
    assert!(!c.is_open(), "third client must be accepted then closed");
    assert_eq!(bridge.client_count(), 2);
}

#[test]
fn freed_slot_is_reused_by_the_next_client() {
    let (mut bridge, listener) = bridge_with(2);

    let a = seat(&mut bridge, &listener);
    let b = seat(&mut bridge, &listener);

    a.disconnect();
    let c = seat(&mut bridge, &listener);

    assert!(c.is_open(), "client after a disconnect takes the freed slot");
    assert!(b.is_open());
    assert_eq!(bridge.client_count(), 2);
}

#[test]
fn default_single_slot_pool() {
    // The deployed configuration: one console client at a time.
    let (mut bridge, listener) = bridge_with(1);

    let first = seat(&mut bridge, &listener);
    let second = seat(&mut bridge, &listener);
    assert!(first.is_open());
    assert!(!second.is_open());

    first.disconnect();
    let third = seat(&mut bridge, &listener);
    assert!(third.is_open());
}

#[test]
fn client_bytes_keep_order_across_ticks() {
    let (mut bridge, listener) = bridge_with(1);
    let client = seat(&mut bridge, &listener);

    client.push_incoming(b"A");
    bridge.tick().unwrap();
    client.push_incoming(b"B");
    bridge.tick().unwrap();
    client.push_incoming(b"C");
    bridge.tick().unwrap();

    assert_eq!(bridge.serial().written(), b"ABC");
}

#[test]
fn serial_batch_reaches_every_client_in_slot_order() {
    let (mut bridge, listener) = bridge_with(3);
    let a = seat(&mut bridge, &listener);
    let b = seat(&mut bridge, &listener);
    let c = seat(&mut bridge, &listener);

    bridge.serial_mut().push_incoming(b"boot ok\r\n");
    bridge.tick().unwrap();

    for client in [&a, &b, &c] {
        assert_eq!(client.received(), b"boot ok\r\n");
    }
}

#[test]
fn serial_batch_consumed_once_per_tick() {
    let (mut bridge, listener) = bridge_with(1);
    let client = seat(&mut bridge, &listener);

    bridge.serial_mut().push_incoming(b"x");
    bridge.tick().unwrap();
    bridge.tick().unwrap();

    // The batch was read once; a second tick must not duplicate it.
    assert_eq!(client.received(), b"x");
}

#[test]
fn bidirectional_traffic_in_one_tick() {
    let (mut bridge, listener) = bridge_with(1);
    let client = seat(&mut bridge, &listener);

    client.push_incoming(b"keys");
    bridge.serial_mut().push_incoming(b"echo");
    bridge.tick().unwrap();

    assert_eq!(bridge.serial().written(), b"keys");
    assert_eq!(client.received(), b"echo");
}

#[test]
fn serial_output_not_delivered_to_rejected_client() {
    let (mut bridge, listener) = bridge_with(1);
    let seated = seat(&mut bridge, &listener);
    let rejected = seat(&mut bridge, &listener);

    bridge.serial_mut().push_incoming(b"secret");
    bridge.tick().unwrap();

    assert_eq!(seated.received(), b"secret");
    assert!(rejected.received().is_empty());
}
