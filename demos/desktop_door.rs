//! Desktop door controller for testing the MQTT protocol without hardware.
//!
//! Runs the full control loop against a local broker with a mock relay, so
//! the topics, retained status, and pulse timing can be exercised with any
//! MQTT client:
//!
//! ```sh
//! mosquitto_pub -t home/main_floor/garage/left_door/switch/set -m 1
//! mosquitto_sub -t home/main_floor/garage/left_door/switch/status -v
//! ```
//!
//! # Usage
//!
//! ```sh
//! cargo run --example desktop_door --features mqtt
//! ```
//!
//! # Configuration
//!
//! Edit the `Config::default()` call in `main()` to customize settings,
//! e.g. `.with_mqtt(MqttConfig::default().with_host("192.168.1.100"))`.

use std::time::Duration;

use garage_relay::hal::{MockRelay, StdClock, StdDelay};
use garage_relay::services::RumqttcMqtt;
use garage_relay::traits::Clock;
use garage_relay::{Config, DoorChannel, DoorController};

/// Main loop interval in milliseconds
const LOOP_INTERVAL_MS: u64 = 20;

fn main() -> anyhow::Result<()> {
    println!("=================================");
    println!("  garage-relay Desktop Door");
    println!("=================================");
    println!();

    // Central configuration - modify this for your setup
    let config = Config::default();
    // Example of customization:
    // let config = Config::default()
    //     .with_mqtt(garage_relay::MqttConfig::default()
    //         .with_host("192.168.1.100")
    //         .with_topic_prefix("home/main_floor/garage"))
    //     .with_switch(garage_relay::SwitchConfig::default()
    //         .with_pulse_ms(1000));

    println!("Broker: {}:{}", config.mqtt.host, config.mqtt.port);
    println!("Topics:");
    for door in garage_relay::Door::ALL {
        println!("  Subscribe: {}", config.mqtt.command_topic(door));
        println!("  Publish:   {} (retained)", config.mqtt.status_topic(door));
    }
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let mut controller = DoorController::new(MockRelay::new(), config.switch.pulse_ms);
    let mqtt = RumqttcMqtt::new(&config.mqtt);
    let mut channel = DoorChannel::new(mqtt, config.mqtt.clone());

    let clock = StdClock::new();
    let mut delay = StdDelay;

    loop {
        let attempts = channel.ensure_connected(&controller, &mut delay);
        if attempts > 0 {
            println!("[MQTT] Session established");
        }

        let now_ms = clock.now_ms();
        if let Err(e) = channel.poll(&mut controller, now_ms) {
            eprintln!("[MQTT] Poll failed: {e}");
        }

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

        std::thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
