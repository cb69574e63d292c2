//! Door relay driver using ESP32 GPIO outputs.
//!
//! Each door's relay module is switched by one GPIO: high closes the
//! contact (button pressed), low opens it. Both pins are driven low during
//! construction so the doors are guaranteed released at boot.

use esp_idf_hal::gpio::{AnyOutputPin, Level, Output, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::{Door, RelayOutput};

/// Two-channel relay driver for the door switches.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::gpio::OutputPin;
/// use garage_relay::hal::esp32::Esp32Relay;
///
/// let peripherals = Peripherals::take()?;
/// let relay = Esp32Relay::new(
///     peripherals.pins.gpio4.downgrade_output(),
///     peripherals.pins.gpio5.downgrade_output(),
/// )?;
/// ```
pub struct Esp32Relay<'d> {
    left: PinDriver<'d, AnyOutputPin, Output>,
    right: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> Esp32Relay<'d> {
    /// Creates the relay driver with both outputs released.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        left_pin: impl Peripheral<P = AnyOutputPin> + 'd,
        right_pin: impl Peripheral<P = AnyOutputPin> + 'd,
    ) -> Result<Self, EspError> {
        let mut left = PinDriver::output(left_pin)?;
        let mut right = PinDriver::output(right_pin)?;

        // Rest state before anything else runs.
        left.set_low()?;
        right.set_low()?;

        Ok(Self { left, right })
    }
}

impl RelayOutput for Esp32Relay<'_> {
    type Error = EspError;

    fn set_level(&mut self, door: Door, pressed: bool) -> Result<(), Self::Error> {
        let level = if pressed { Level::High } else { Level::Low };
        match door {
            Door::Left => self.left.set_level(level),
            Door::Right => self.right.set_level(level),
        }
    }
}
