//! ESP32 hardware abstraction layer for the garage door controller.
//!
//! This module provides hardware implementations for an ESP32 board driving
//! two door relays, with optional WiFi/MQTT connectivity and the serial
//! console UART for the bridge firmware variant.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 family (esp-idf based)
//! - **Relays**: two active-high relay modules on the switch GPIOs
//! - **Console**: UART0 at 115200 baud (bridge variant)
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for the GPIO assignments.

mod clock;
mod delay;
mod relay;
mod uart;

pub use clock::Esp32Clock;
pub use delay::Esp32Delay;
pub use relay::Esp32Relay;
pub use uart::Esp32Serial;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "esp32-mqtt")]
mod mqtt;
#[cfg(feature = "esp32-mqtt")]
pub use mqtt::{Esp32Mqtt, Esp32MqttError};

/// Pin assignments.
///
/// The relay pins match the deployed wiring; both are driven low before
/// being configured as outputs so a reboot never pulses a door.
pub mod pins {
    /// Left door relay output
    pub const LEFT_SWITCH: i32 = 4;

    /// Right door relay output
    pub const RIGHT_SWITCH: i32 = 5;

    /// Console UART TX (bridge variant)
    pub const UART_TX: i32 = 21;

    /// Console UART RX (bridge variant)
    pub const UART_RX: i32 = 20;
}
