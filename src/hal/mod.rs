//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `desktop`: Wall-clock time sources (requires `std`)
//! - `net`: Non-blocking TCP bridge listener (requires `std`)
//! - `esp32`: ESP32 relays, UART, WiFi, and MQTT (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod desktop;

#[cfg(feature = "std")]
pub mod net;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "std")]
pub use desktop::*;

#[cfg(feature = "std")]
pub use net::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
