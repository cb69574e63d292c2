//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use garage_relay::config::{Config, MqttConfig, BridgeConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_bridge(BridgeConfig::default().with_port(2323));
//! ```

use heapless::String as HString;

use crate::commands::{COMMAND_SUFFIX, STATUS_SUFFIX};
use crate::traits::Door;

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (topic paths)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Take only what fits
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let take = s.len().min(MAX_LONG_STRING);
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// MQTT client configuration
    pub mqtt: MqttConfig,
    /// Switch/pulse configuration
    pub switch: SwitchConfig,
    /// Serial console bridge configuration
    pub bridge: BridgeConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set MQTT configuration
    pub fn with_mqtt(mut self, mqtt: MqttConfig) -> Self {
        self.mqtt = mqtt;
        self
    }

    /// Set switch configuration
    pub fn with_switch(mut self, switch: SwitchConfig) -> Self {
        self.switch = switch;
        self
    }

    /// Set bridge configuration
    pub fn with_bridge(mut self, bridge: BridgeConfig) -> Self {
        self.bridge = bridge;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// MQTT Config
// ============================================================================

/// MQTT client configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MqttConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Topic prefix below which the per-door topics live
    /// (e.g. "home/main_floor/garage" -> ".../left_door/switch/set")
    pub topic_prefix: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Wait between reconnect attempts in milliseconds
    pub reconnect_backoff_ms: u32,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("garage-relay"),
            topic_prefix: short_string("home/main_floor/garage"),
            username: ShortString::new(),
            password: ShortString::new(),
            reconnect_backoff_ms: 5000,
            keep_alive_secs: 30,
        }
    }
}

impl MqttConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set the topic prefix
    pub fn with_topic_prefix(mut self, prefix: &str) -> Self {
        self.topic_prefix = short_string(prefix);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the reconnect backoff
    pub fn with_reconnect_backoff_ms(mut self, ms: u32) -> Self {
        self.reconnect_backoff_ms = ms;
        self
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }

    /// Command topic for one door, e.g.
    /// `home/main_floor/garage/left_door/switch/set`.
    pub fn command_topic(&self, door: Door) -> LongString {
        self.door_topic(door, COMMAND_SUFFIX)
    }

    /// Status topic for one door, e.g.
    /// `home/main_floor/garage/left_door/switch/status`.
    pub fn status_topic(&self, door: Door) -> LongString {
        self.door_topic(door, STATUS_SUFFIX)
    }

    fn door_topic(&self, door: Door, suffix: &str) -> LongString {
        let mut topic = LongString::new();
        let _ = topic.push_str(self.topic_prefix.as_str());
        let _ = topic.push('/');
        let _ = topic.push_str(door.as_str());
        let _ = topic.push('/');
        let _ = topic.push_str(suffix);
        topic
    }
}

// ============================================================================
// Switch Config
// ============================================================================

/// Switch/pulse configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchConfig {
    /// Momentary press duration in milliseconds (identical for both doors)
    pub pulse_ms: u32,
    /// GPIO pin for the left door relay
    pub left_pin: u8,
    /// GPIO pin for the right door relay
    pub right_pin: u8,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 2000,
            left_pin: 4,
            right_pin: 5,
        }
    }
}

impl SwitchConfig {
    /// Set the pulse duration
    pub fn with_pulse_ms(mut self, ms: u32) -> Self {
        self.pulse_ms = ms;
        self
    }

    /// Set the relay GPIO pins
    pub fn with_pins(mut self, left: u8, right: u8) -> Self {
        self.left_pin = left;
        self.right_pin = right;
        self
    }
}

// ============================================================================
// Bridge Config
// ============================================================================

/// Serial console bridge configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BridgeConfig {
    /// TCP port the bridge listens on
    pub port: u16,
    /// Maximum simultaneous stream clients
    pub max_clients: usize,
    /// Serial line baud rate
    pub baud_rate: u32,
    /// Whether the bridge is enabled (bridge firmware variant only)
    pub enabled: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: 23,
            max_clients: 1,
            baud_rate: 115_200,
            enabled: false,
        }
    }
}

impl BridgeConfig {
    /// Set the listen port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client pool size
    pub fn with_max_clients(mut self, max: usize) -> Self {
        self.max_clients = max;
        self
    }

    /// Set the serial baud rate
    pub fn with_baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Enable or disable the bridge
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u32,
    /// Whether WiFi is enabled
    pub enabled: bool,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            connect_timeout_ms: 30_000,
            enabled: true,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Device ID (doubles as OTA hostname)
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("garage-relay"),
            id: short_string("garage1"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.reconnect_backoff_ms, 5000);
        assert_eq!(config.switch.pulse_ms, 2000);
        assert_eq!(config.bridge.max_clients, 1);
        assert!(!config.bridge.enabled);
    }

    #[test]
    fn default_topics_match_wire_contract() {
        let mqtt = MqttConfig::default();
        assert_eq!(
            mqtt.command_topic(Door::Left).as_str(),
            "home/main_floor/garage/left_door/switch/set"
        );
        assert_eq!(
            mqtt.command_topic(Door::Right).as_str(),
            "home/main_floor/garage/right_door/switch/set"
        );
        assert_eq!(
            mqtt.status_topic(Door::Left).as_str(),
            "home/main_floor/garage/left_door/switch/status"
        );
        assert_eq!(
            mqtt.status_topic(Door::Right).as_str(),
            "home/main_floor/garage/right_door/switch/status"
        );
    }

    #[test]
    fn custom_prefix_topics() {
        let mqtt = MqttConfig::default().with_topic_prefix("barn");
        assert_eq!(
            mqtt.command_topic(Door::Left).as_str(),
            "barn/left_door/switch/set"
        );
    }

    #[test]
    fn builder_chaining() {
        let config = Config::default()
            .with_mqtt(
                MqttConfig::default()
                    .with_host("broker.local")
                    .with_client_id("garage-test")
                    .with_auth("user", "pass"),
            )
            .with_switch(SwitchConfig::default().with_pulse_ms(1500))
            .with_bridge(
                BridgeConfig::default()
                    .with_port(2323)
                    .with_max_clients(4)
                    .with_enabled(true),
            );

        assert_eq!(config.mqtt.host.as_str(), "broker.local");
        assert!(config.mqtt.has_auth());
        assert_eq!(config.switch.pulse_ms, 1500);
        assert_eq!(config.bridge.port, 2323);
        assert_eq!(config.bridge.max_clients, 4);
        assert!(config.bridge.enabled);
    }

    #[test]
    fn short_string_truncates() {
        let long = "x".repeat(200);
        let s = short_string(&long);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn wifi_is_configured() {
        assert!(!WifiConfig::default().is_configured());
        assert!(WifiConfig::default().with_ssid("net").is_configured());
    }
}
