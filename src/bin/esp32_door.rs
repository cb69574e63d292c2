//! ESP32 garage-door controller firmware (door-only variant).
//!
//! This is the main entry point for the relay controller. It runs a
//! cooperative control loop that, in fixed order each iteration:
//! - Ensures the MQTT session is live (blocking reconnect with backoff)
//! - Leaves room for platform housekeeping (OTA runs as a background task)
//! - Dispatches inbound press commands to the door controller
//! - Due-checks both auto-release timers and publishes released states
//!
//! # Build
//!
//! ```bash
//! cargo build --bin esp32_door --features esp32-mqtt
//! ```
//!
//! WiFi/MQTT credentials come from compile-time env vars: `WIFI_SSID`,
//! `WIFI_PASSWORD`, `MQTT_HOST`, `MQTT_USER`, `MQTT_PASSWORD`.

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripherals::Peripherals;

use garage_relay::hal::esp32::{Esp32Clock, Esp32Delay, Esp32Mqtt, Esp32Relay, Esp32Wifi};
use garage_relay::traits::Clock;
use garage_relay::{Config, DoorChannel, DoorController};

/// Main loop interval in milliseconds
const LOOP_INTERVAL_MS: u32 = 20;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    println!();
    println!("================================");
    println!("  garage-relay door controller");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default()
        .with_wifi(
            garage_relay::WifiConfig::default()
                .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
                .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
        )
        .with_mqtt(
            garage_relay::MqttConfig::default()
                .with_host(option_env!("MQTT_HOST").unwrap_or("localhost"))
                .with_auth(
                    option_env!("MQTT_USER").unwrap_or(""),
                    option_env!("MQTT_PASSWORD").unwrap_or(""),
                ),
        );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Initialize Relays (GPIO4/5, driven low before anything else)
    // =========================================================================
    let relay = Esp32Relay::new(
        peripherals.pins.gpio4.downgrade_output(),
        peripherals.pins.gpio5.downgrade_output(),
    )?;
    println!("[OK] Relays initialized (GPIO4/5)");

    let mut controller = DoorController::new(relay, config.switch.pulse_ms);

    // =========================================================================
    // Initialize WiFi (join failure reboots, as deployed)
    // =========================================================================
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let _wifi = match Esp32Wifi::new(peripherals.modem, sysloop, Some(nvs), &config.wifi) {
        Ok(wifi) => wifi,
        Err(e) => {
            eprintln!("[WiFi] Connection failed: {e}. Rebooting...");
            FreeRtos::delay_ms(5000);
            unsafe { esp_idf_hal::sys::esp_restart() };
            unreachable!()
        }
    };

    // OTA update service starts here as a background esp-idf task; the
    // control loop below only has to keep yielding so it gets CPU time.

    // =========================================================================
    // Initialize MQTT channel
    // =========================================================================
    let mqtt = Esp32Mqtt::new(&config.mqtt)?;
    let mut channel = DoorChannel::new(mqtt, config.mqtt.clone());
    println!("[OK] MQTT channel ready");

    let clock = Esp32Clock::new();
    let mut delay = Esp32Delay::new();

    println!("[OK] Entering control loop");

    loop {
        // (a) Session liveness. Blocks while the broker is unreachable,
        // which also freezes the timers below - the long-deployed trade-off.
        channel.ensure_connected(&controller, &mut delay);

        // (b) Platform housekeeping (OTA): background task, nothing to do.

        // (c) Inbound commands.
        let now_ms = clock.now_ms();
        if let Err(e) = channel.poll(&mut controller, now_ms) {
            eprintln!("[MQTT] Poll failed: {e}");
        }

        // (e) Timer due-check; publish any auto-released door.
        match controller.tick(clock.now_ms()) {
            Ok(released) => {
                for door in released {
                    println!("[Door] Auto-released {}", door.as_str());
                    if let Err(e) = channel.publish_door(&controller, door) {
                        eprintln!("[MQTT] Status publish failed: {e}");
                    }
                }
            }
            Err(e) => eprintln!("[Relay] Drive failed: {e:?}"),
        }

        FreeRtos::delay_ms(LOOP_INTERVAL_MS);
    }
}
