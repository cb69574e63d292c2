//! FreeRTOS-based blocking delay.

use esp_idf_hal::delay::FreeRtos;

use crate::traits::Delay;

/// Blocking delay that yields to FreeRTOS.
///
/// Used for the channel reconnect backoff; yielding keeps the watchdog and
/// background services (WiFi, OTA) fed while the loop waits.
pub struct Esp32Delay;

impl Esp32Delay {
    /// Creates a new delay instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Esp32Delay {
    fn default() -> Self {
        Self::new()
    }
}

impl Delay for Esp32Delay {
    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}
