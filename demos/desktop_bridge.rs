//! Desktop console bridge for testing the TCP relay without hardware.
//!
//! Binds the bridge listener on localhost with a loopback "serial line"
//! that echoes every byte back, so a telnet/netcat session sees its own
//! keystrokes mirrored:
//!
//! ```sh
//! cargo run --example desktop_bridge
//! nc 127.0.0.1 2323
//! ```
//!
//! With the default pool size of one slot, a second `nc` is accepted and
//! immediately closed while the first stays connected.

use std::collections::VecDeque;
use std::time::Duration;

use garage_relay::hal::net::TcpBridgeListener;
use garage_relay::traits::SerialPort;
use garage_relay::{BridgeConfig, SerialBridge};

/// Main loop interval in milliseconds
const LOOP_INTERVAL_MS: u64 = 20;

/// Stand-in serial line: everything written comes back as input.
#[derive(Default)]
struct LoopbackSerial {
    pending: VecDeque<u8>,
}

impl SerialPort for LoopbackSerial {
    type Error = std::io::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.pending.extend(bytes.iter().copied());
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    println!("=================================");
    println!("  garage-relay Desktop Bridge");
    println!("=================================");
    println!();

    let config = BridgeConfig::default().with_port(2323);

    let listener = TcpBridgeListener::bind(([127, 0, 0, 1], config.port).into())?;
    let mut bridge = SerialBridge::new(listener, LoopbackSerial::default(), config.max_clients);

    println!(
        "Listening on 127.0.0.1:{} ({} client slots, loopback serial)",
        config.port, config.max_clients
    );
    println!("Connect with: nc 127.0.0.1 {}", config.port);
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    loop {
        if let Err(e) = bridge.tick() {
            eprintln!("[Bridge] Serial error: {e}");
        }
        std::thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
