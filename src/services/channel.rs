//! Command/state channel: the MQTT protocol layer over any [`MqttClient`].
//!
//! Subscribes to the two command topics and publishes the two retained
//! status topics:
//!
//! **Subscribe Topics:**
//! - `<prefix>/left_door/switch/set` - payload `"1"` pulses the left door
//! - `<prefix>/right_door/switch/set` - payload `"1"` pulses the right door
//!
//! **Publish Topics (retained):**
//! - `<prefix>/left_door/switch/status` - `"1"` pressed / `"0"` released
//! - `<prefix>/right_door/switch/status` - `"1"` pressed / `"0"` released
//!
//! # Session lifecycle
//!
//! While the session is down no protocol traffic flows. Call
//! [`ensure_connected`](DoorChannel::ensure_connected) once per loop
//! iteration: it blocks, retrying with a fixed backoff, until the session
//! is live, then announces both door states **before** re-subscribing to
//! the command topics (so an early command cannot race the publisher's
//! readiness to report the resulting state; best-effort, not atomic).
//!
//! The blocking retry deliberately mirrors the long-deployed behavior:
//! while the broker is unreachable, timers and the serial bridge freeze
//! too. A corrected design would service [`DoorController::tick`] and the
//! bridge independently of channel connectivity.

use crate::commands::{parse_command, status_payload, DoorCommand};
use crate::config::MqttConfig;
use crate::controller::DoorController;
use crate::traits::{Delay, Door, MqttClient, RelayOutput};

/// MQTT protocol driver for the door controller.
///
/// Generic over any [`MqttClient`], so the same protocol logic runs against
/// the ESP32 client, the rumqttc desktop client, and the test mock.
pub struct DoorChannel<C: MqttClient> {
    client: C,
    config: MqttConfig,
}

impl<C: MqttClient> DoorChannel<C> {
    /// Create a channel over an MQTT client.
    pub fn new(client: C, config: MqttConfig) -> Self {
        Self { client, config }
    }

    /// Get a reference to the MQTT client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get a mutable reference to the MQTT client.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Block until the session is live, retrying with the configured
    /// backoff between attempts. Returns the number of reconnect attempts
    /// made (0 when the session was already up).
    ///
    /// On every successful (re)connection the current state of both doors
    /// is announced and the command subscriptions re-established, in that
    /// order.
    pub fn ensure_connected<R, D>(
        &mut self,
        controller: &DoorController<R>,
        delay: &mut D,
    ) -> u32
    where
        R: RelayOutput,
        D: Delay,
    {
        let mut attempts = 0;
        while !self.client.is_connected() {
            attempts += 1;
            match self.client.reconnect() {
                Ok(()) => {
                    // Best-effort: a publish failure here means the session
                    // dropped again and the outer loop retries.
                    let _ = self.announce(controller);
                }
                Err(_) => delay.delay_ms(self.config.reconnect_backoff_ms),
            }
        }
        attempts
    }

    /// Publish both door states (retained), then subscribe to both command
    /// topics. State announcement must precede subscription.
    pub fn announce<R: RelayOutput>(
        &mut self,
        controller: &DoorController<R>,
    ) -> Result<(), C::Error> {
        self.publish_all(controller)?;
        for door in Door::ALL {
            self.client
                .subscribe(self.config.command_topic(door).as_str())?;
        }
        Ok(())
    }

    /// Poll for incoming command messages and apply them.
    ///
    /// Drains every pending message. A valid press command re-triggers the
    /// door (state true, timer re-armed) and publishes the new state; any
    /// other payload or topic is ignored without a publish.
    pub fn poll<R: RelayOutput>(
        &mut self,
        controller: &mut DoorController<R>,
        now_ms: u64,
    ) -> Result<(), C::Error> {
        while let Some(msg) = self.client.try_recv() {
            let Some(cmd) = self.parse_message(&msg.topic, &msg.payload) else {
                continue;
            };
            match cmd {
                DoorCommand::Press(door) => {
                    // A failed relay drive publishes no state; the channel
                    // keeps serving.
                    if controller.press(door, now_ms).is_ok() {
                        self.publish_door(controller, door)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Publish one door's current state, retained.
    pub fn publish_door<R: RelayOutput>(
        &mut self,
        controller: &DoorController<R>,
        door: Door,
    ) -> Result<(), C::Error> {
        let payload = status_payload(controller.is_pressed(door));
        self.client.publish(
            self.config.status_topic(door).as_str(),
            payload.as_bytes(),
            true,
        )
    }

    /// Publish both doors' current state, retained.
    pub fn publish_all<R: RelayOutput>(
        &mut self,
        controller: &DoorController<R>,
    ) -> Result<(), C::Error> {
        for door in Door::ALL {
            self.publish_door(controller, door)?;
        }
        Ok(())
    }

    /// Strip the configured prefix and parse the remainder into a command.
    fn parse_message(&self, topic: &str, payload: &[u8]) -> Option<DoorCommand> {
        let prefix = self.config.topic_prefix.as_str();
        let suffix = topic.strip_prefix(prefix)?.strip_prefix('/')?;
        parse_command(suffix, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockDelay, MockMqtt, MockOp, MockRelay};

    fn setup() -> (DoorController<MockRelay>, DoorChannel<MockMqtt>) {
        let controller = DoorController::new(MockRelay::new(), 2000);
        let channel = DoorChannel::new(MockMqtt::new(), MqttConfig::default());
        (controller, channel)
    }

    #[test]
    fn announce_publishes_before_subscribing() {
        let (controller, mut channel) = setup();

        channel.announce(&controller).unwrap();

        let history = &channel.client().history;
        assert_eq!(history.len(), 4);
        assert!(matches!(history[0], MockOp::Publish(_)));
        assert!(matches!(history[1], MockOp::Publish(_)));
        assert!(matches!(history[2], MockOp::Subscribe(_)));
        assert!(matches!(history[3], MockOp::Subscribe(_)));
    }

    #[test]
    fn announce_subscribes_both_command_topics() {
        let (controller, mut channel) = setup();

        channel.announce(&controller).unwrap();

        let client = channel.client();
        assert!(client.is_subscribed("home/main_floor/garage/left_door/switch/set"));
        assert!(client.is_subscribed("home/main_floor/garage/right_door/switch/set"));
    }

    #[test]
    fn announce_publishes_released_retained() {
        let (controller, mut channel) = setup();

        channel.announce(&controller).unwrap();

        let client = channel.client();
        for topic in [
            "home/main_floor/garage/left_door/switch/status",
            "home/main_floor/garage/right_door/switch/status",
        ] {
            let published = client.published_to(topic);
            assert_eq!(published.len(), 1);
            let (_, payload, retained) = published[0];
            assert_eq!(payload, b"0");
            assert!(*retained, "status must be retained");
        }
    }

    #[test]
    fn press_command_pulses_and_publishes() {
        let (mut controller, mut channel) = setup();
        channel
            .client_mut()
            .queue_message("home/main_floor/garage/left_door/switch/set", b"1".to_vec());

        channel.poll(&mut controller, 0).unwrap();

        assert!(controller.is_pressed(Door::Left));
        assert!(controller.is_armed(Door::Left));
        let published =
            channel.client().published_to("home/main_floor/garage/left_door/switch/status");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1, b"1");
        assert!(published[0].2);
    }

    #[test]
    fn non_press_payload_is_ignored_without_publish() {
        let (mut controller, mut channel) = setup();
        for payload in [&b"0"[..], b"on", b"", b"2"] {
            channel.client_mut().queue_message(
                "home/main_floor/garage/left_door/switch/set",
                payload.to_vec(),
            );
        }

        channel.poll(&mut controller, 0).unwrap();

        assert!(!controller.is_pressed(Door::Left));
        assert!(channel.client().published.is_empty());
    }

    #[test]
    fn status_topic_traffic_is_ignored() {
        let (mut controller, mut channel) = setup();
        // Our own retained status echoing back must not re-trigger.
        channel.client_mut().queue_message(
            "home/main_floor/garage/left_door/switch/status",
            b"1".to_vec(),
        );

        channel.poll(&mut controller, 0).unwrap();

        assert!(!controller.is_pressed(Door::Left));
    }

    #[test]
    fn foreign_prefix_is_ignored() {
        let (mut controller, mut channel) = setup();
        channel
            .client_mut()
            .queue_message("other/house/left_door/switch/set", b"1".to_vec());

        channel.poll(&mut controller, 0).unwrap();

        assert!(!controller.is_pressed(Door::Left));
    }

    #[test]
    fn repress_restarts_pulse_window() {
        let (mut controller, mut channel) = setup();
        channel
            .client_mut()
            .queue_message("home/main_floor/garage/right_door/switch/set", b"1".to_vec());
        channel.poll(&mut controller, 0).unwrap();

        // Second press mid-pulse.
        channel
            .client_mut()
            .queue_message("home/main_floor/garage/right_door/switch/set", b"1".to_vec());
        channel.poll(&mut controller, 1500).unwrap();

        // Old deadline passes without a release...
        assert!(controller.tick(2000).unwrap().is_empty());
        // ...the restarted window releases once.
        assert_eq!(controller.tick(3500).unwrap().as_slice(), &[Door::Right]);

        // One status publish per press.
        let published =
            channel.client().published_to("home/main_floor/garage/right_door/switch/status");
        assert_eq!(published.len(), 2);
    }

    #[test]
    fn ensure_connected_noop_when_live() {
        let (controller, mut channel) = setup();
        let mut delay = MockDelay::new();

        let attempts = channel.ensure_connected(&controller, &mut delay);

        assert_eq!(attempts, 0);
        assert!(delay.sleeps.is_empty());
        assert!(channel.client().history.is_empty());
    }

    #[test]
    fn ensure_connected_backs_off_then_announces() {
        let (controller, mut channel) = setup();
        channel.client_mut().connected = false;
        channel.client_mut().fail_reconnects = 2;
        let mut delay = MockDelay::new();

        let attempts = channel.ensure_connected(&controller, &mut delay);

        assert_eq!(attempts, 3);
        // Fixed 5s backoff after each failed attempt.
        assert_eq!(delay.sleeps, vec![5000, 5000]);
        assert!(channel.client().is_connected());
        // Reconnect re-announced: publishes then subscribes.
        assert!(matches!(channel.client().history[0], MockOp::Publish(_)));
        assert!(channel
            .client()
            .is_subscribed("home/main_floor/garage/left_door/switch/set"));
    }
}
