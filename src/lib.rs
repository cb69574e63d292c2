//! # garage-relay
//!
//! A network-attached garage-door relay controller with MQTT control and an
//! optional serial-to-TCP console bridge.
//!
//! ## Features
//!
//! - **Momentary switches**: each door's relay is pulsed for a fixed window
//!   and auto-released by its own single-shot timer (last-press-wins)
//! - **MQTT command/state protocol**: payload `"1"` on a door's command
//!   topic presses it; the switch state is published retained as `"1"`/`"0"`
//! - **Console bridge**: one serial line mirrored transparently to a small
//!   fixed pool of TCP clients (bridge firmware variant)
//! - **Hardware abstraction**: traits for relays, clock, delay, serial, and
//!   MQTT, with mock implementations for desktop testing
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and network abstractions
//! - `switch` / `timer` / `controller` - The momentary-switch state machine
//! - `commands` - Wire payloads and command parsing
//! - `bridge` - The serial-to-stream relay with its bounded slot pool
//! - `services` - The MQTT channel protocol and the desktop client
//! - `config` - heapless-based configuration shared by all platforms
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use garage_relay::{config::MqttConfig, Door, DoorChannel, DoorController};
//! use garage_relay::hal::{MockMqtt, MockRelay};
//!
//! let mut controller = DoorController::new(MockRelay::new(), 2000);
//! let mut channel = DoorChannel::new(MockMqtt::new(), MqttConfig::default());
//!
//! // Announce state and subscribe to the command topics
//! channel.announce(&controller).unwrap();
//!
//! // A press command arrives...
//! channel.client_mut().queue_message(
//!     "home/main_floor/garage/left_door/switch/set",
//!     b"1".to_vec(),
//! );
//! channel.poll(&mut controller, 0).unwrap();
//! assert!(controller.is_pressed(Door::Left));
//!
//! // ...and the pulse window releases it
//! let released = controller.tick(2000).unwrap();
//! assert_eq!(released.as_slice(), &[Door::Left]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Transparent serial-to-stream bridge with a bounded client slot pool.
pub mod bridge;
/// Wire payloads and command parsing for the switch protocol.
pub mod commands;
/// Main controller tying switches and auto-release timers together.
pub mod controller;
/// Switch actuator owning the relay levels.
pub mod switch;
/// Per-door single-shot auto-release timer.
pub mod timer;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;

/// MQTT channel protocol and platform clients.
pub mod services;

// Re-exports for convenience
pub use bridge::SerialBridge;
pub use commands::{DoorCommand, PAYLOAD_PRESSED, PAYLOAD_RELEASED};
pub use controller::{DoorController, SwitchSnapshot};
pub use services::channel::DoorChannel;
pub use switch::SwitchBank;
pub use timer::AutoReleaseTimer;
pub use traits::{
    // Hardware
    Clock,
    Delay,
    Door,
    // Network
    MqttClient,
    MqttMessage,
    RelayOutput,
    SerialPort,
    StreamConnection,
    StreamListener,
};

// Config re-exports
pub use config::{BridgeConfig, Config, DeviceConfig, MqttConfig, SwitchConfig, WifiConfig};

#[cfg(feature = "mqtt")]
pub use services::mqtt::RumqttcMqtt;
