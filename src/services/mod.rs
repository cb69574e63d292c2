//! Protocol services above the hardware traits.
//!
//! - `channel`: the MQTT command/state protocol, generic over any
//!   [`MqttClient`](crate::traits::MqttClient) implementation (ESP32,
//!   desktop, mock).
//! - `mqtt` (feature `mqtt`): rumqttc-backed desktop client.
//!
//! The channel layer deliberately contains all protocol decisions (topic
//! layout, announce ordering, reconnect backoff) so the platform clients
//! stay thin transports.

pub mod channel;

#[cfg(feature = "mqtt")]
pub mod mqtt;

pub use channel::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;
