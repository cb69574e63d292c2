//! Desktop MQTT client backed by `rumqttc`.
//!
//! Implements the [`MqttClient`] trait over rumqttc's synchronous client so
//! the same [`DoorChannel`](crate::services::channel::DoorChannel) protocol
//! logic drives a real broker on desktop.
//!
//! rumqttc runs its own network event loop; here it lives on a background
//! thread that forwards inbound publishes through an mpsc queue and tracks
//! session liveness in an atomic flag. The control loop only ever touches
//! the queue and the flag, preserving the single-threaded mutation model.
//!
//! # Example
//!
//! ```ignore
//! use garage_relay::config::MqttConfig;
//! use garage_relay::services::{DoorChannel, RumqttcMqtt};
//!
//! let config = MqttConfig::default().with_host("192.168.1.100");
//! let client = RumqttcMqtt::new(&config);
//! let mut channel = DoorChannel::new(client, config);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rumqttc::{Client, Connection, ConnectionError, Event, MqttOptions, Packet, QoS};

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// MQTT client for desktop use, wrapping `rumqttc::Client`.
///
/// Reconnection is handled inside rumqttc's event loop; the trait's
/// `reconnect` therefore only verifies that the session came back, and the
/// channel layer's backoff paces the checks.
pub struct RumqttcMqtt {
    client: Client,
    message_rx: Receiver<MqttMessage>,
    connected: Arc<AtomicBool>,
}

impl RumqttcMqtt {
    /// Create a client and start its event thread.
    ///
    /// The connection is established asynchronously by the event thread;
    /// `is_connected` turns true once the broker acknowledges the session.
    pub fn new(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.as_str(),
            config.host.as_str(),
            config.port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));
        if config.has_auth() {
            options.set_credentials(config.username.as_str(), config.password.as_str());
        }

        let (client, connection) = Client::new(options, 10);
        let (message_tx, message_rx) = channel::<MqttMessage>();
        let connected = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&connected);
        thread::spawn(move || {
            run_event_loop(connection, message_tx, flag);
        });

        Self {
            client,
            message_rx,
            connected,
        }
    }
}

fn run_event_loop(
    mut connection: Connection,
    message_tx: Sender<MqttMessage>,
    connected: Arc<AtomicBool>,
) {
    for event in connection.iter() {
        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::SeqCst);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let msg = MqttMessage::new(publish.topic.clone(), publish.payload.to_vec());
                if message_tx.send(msg).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(ConnectionError::RequestsDone) => break,
            Err(e) => {
                connected.store(false, Ordering::SeqCst);
                eprintln!("[MQTT] Connection error: {e}");
                // The iterator retries the connection on its own; pace it.
                thread::sleep(Duration::from_secs(1));
            }
        }
    }
    connected.store(false, Ordering::SeqCst);
}

impl MqttClient for RumqttcMqtt {
    type Error = RumqttcError;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        let qos = if retain {
            QoS::AtLeastOnce
        } else {
            QoS::AtMostOnce
        };
        self.client
            .publish(topic, qos, retain, payload)
            .map_err(|e| RumqttcError::Publish(e.to_string()))
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| RumqttcError::Subscribe(e.to_string()))
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        match self.message_rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.connected.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn reconnect(&mut self) -> Result<(), Self::Error> {
        // rumqttc's event loop reconnects internally; one "attempt" is a
        // liveness check, and the channel's backoff paces the next one.
        if self.is_connected() {
            Ok(())
        } else {
            Err(RumqttcError::NotConnected)
        }
    }
}

/// Errors from the rumqttc adapter.
#[derive(Debug)]
pub enum RumqttcError {
    /// Failed to enqueue a subscribe request
    Subscribe(String),
    /// Failed to enqueue a publish request
    Publish(String),
    /// Session is not established
    NotConnected,
}

impl std::fmt::Display for RumqttcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subscribe(e) => write!(f, "MQTT subscribe error: {}", e),
            Self::Publish(e) => write!(f, "MQTT publish error: {}", e),
            Self::NotConnected => write!(f, "MQTT session not established"),
        }
    }
}

impl std::error::Error for RumqttcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let error = RumqttcError::Publish("network timeout".to_string());
        let display = format!("{}", error);
        assert!(display.contains("MQTT publish error"));
        assert!(display.contains("network timeout"));
    }

    #[test]
    fn error_is_error() {
        let error = RumqttcError::NotConnected;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn new_client_starts_disconnected() {
        // No broker on this port; the session must report down and
        // reconnect must fail as an attempt.
        let config = MqttConfig::default().with_host("127.0.0.1").with_port(1);
        let mut client = RumqttcMqtt::new(&config);
        assert!(!client.is_connected());
        assert!(client.reconnect().is_err());
        assert!(client.try_recv().is_none());
    }
}
