//! MQTT client for ESP32.
//!
//! Implements the [`MqttClient`] trait over esp-idf-svc's client so the
//! shared [`DoorChannel`](crate::services::channel::DoorChannel) protocol
//! logic runs unchanged on hardware. Incoming messages are queued by an
//! event thread and polled via `try_recv()` from the control loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// MQTT client for the door controller.
///
/// The esp-idf client reconnects internally; the `reconnect` trait method
/// reports whether the session is live again, and the channel layer's
/// backoff paces the checks.
pub struct Esp32Mqtt {
    client: EspMqttClient<'static>,
    message_rx: Receiver<MqttMessage>,
    connected: Arc<AtomicBool>,
}

impl Esp32Mqtt {
    /// Create a new MQTT client and start its event thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created (the connection
    /// itself is established asynchronously).
    pub fn new(config: &MqttConfig) -> anyhow::Result<Self> {
        let broker_url = format!("mqtt://{}:{}", config.host.as_str(), config.port);

        let mqtt_config = MqttClientConfiguration {
            client_id: Some(config.client_id.as_str()),
            username: config.has_auth().then(|| config.username.as_str()),
            password: config.has_auth().then(|| config.password.as_str()),
            keep_alive_interval: Some(Duration::from_secs(config.keep_alive_secs as u64)),
            ..Default::default()
        };

        let (message_tx, message_rx) = channel::<MqttMessage>();
        let connected = Arc::new(AtomicBool::new(false));

        let (client, connection) = EspMqttClient::new(&broker_url, &mqtt_config)?;

        let flag = Arc::clone(&connected);
        thread::spawn(move || {
            handle_mqtt_events(connection, message_tx, flag);
        });

        println!("[MQTT] Client started for {}", broker_url);

        Ok(Self {
            client,
            message_rx,
            connected,
        })
    }
}

fn handle_mqtt_events(
    mut connection: EspMqttConnection,
    message_tx: Sender<MqttMessage>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match connection.next() {
            Err(e) => {
                println!("[MQTT] Event error: {:?}", e);
                thread::sleep(Duration::from_secs(1));
            }
            Ok(event) => match event.payload() {
                EventPayload::Connected(_) => {
                    connected.store(true, Ordering::SeqCst);
                    println!("[MQTT] Connected");
                }
                EventPayload::Disconnected => {
                    connected.store(false, Ordering::SeqCst);
                    println!("[MQTT] Disconnected");
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => {
                    let msg = MqttMessage::new(topic.to_string(), data.to_vec());
                    if message_tx.send(msg).is_err() {
                        return;
                    }
                }
                _ => {}
            },
        }
    }
}

// ============================================================================
// MqttClient Trait Implementation
// ============================================================================

/// Error type for ESP32 MQTT operations.
#[derive(Debug)]
pub struct Esp32MqttError(pub String);

impl core::fmt::Display for Esp32MqttError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MQTT error: {}", self.0)
    }
}

impl std::error::Error for Esp32MqttError {}

impl MqttClient for Esp32Mqtt {
    type Error = Esp32MqttError;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        let qos = if retain {
            QoS::AtLeastOnce
        } else {
            QoS::AtMostOnce
        };
        self.client
            .publish(topic, qos, retain, payload)
            .map_err(|e| Esp32MqttError(format!("{:?}", e)))?;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| Esp32MqttError(format!("{:?}", e)))?;
        Ok(())
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
        // esp-idf reconnects in the background; report whether the session
        // came back so the channel can re-announce.
        if self.is_connected() {
            Ok(())
        } else {
            Err(Esp32MqttError("session not established".into()))
        }
    }
}
