//! Console UART adapter for the serial bridge.

use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::UartDriver;

use crate::traits::SerialPort;

/// Serial line over an ESP-IDF UART driver.
///
/// Reads poll with a zero timeout, so the bridge tick never blocks on an
/// idle console. The binary constructs the [`UartDriver`] (pins, baud rate)
/// and hands it over.
pub struct Esp32Serial<'d> {
    uart: UartDriver<'d>,
}

impl<'d> Esp32Serial<'d> {
    /// Wraps a configured UART driver.
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl SerialPort for Esp32Serial<'_> {
    type Error = EspError;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // Zero-tick timeout: return immediately with whatever is buffered.
        self.uart.read(buf, 0)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut remaining = bytes;
        while !remaining.is_empty() {
            let written = self.uart.write(remaining)?;
            remaining = &remaining[written..];
        }
        Ok(())
    }
}
