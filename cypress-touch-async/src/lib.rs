//! An asynchronous, `no_std` driver for Cypress TrueTouch (TTSP) touch controllers.
//!
//! This driver provides a `CypressTouch` controller that talks to the chip over
//! I2C (default address `0x24`). It brings the controller out of its bootloader,
//! configures the scan intervals and reports up to two touch points per frame,
//! normalized to the display and tracked across frames.
//!
//! # Usage
//!
//! The driver is generic over `embedded-hal-async`: any I2C bus implementing
//! `embedded_hal_async::i2c::I2c`, an interrupt pin implementing
//! `InputPin + Wait`, RTS and enable pins implementing `OutputPin`, and a
//! `DelayNs` implementation such as `embassy_time::Delay`.
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::i2c::master::I2c;
//! # use esp_hal::gpio::{Input, InputConfig, Output, Level, OutputConfig};
//! # use esp_hal::Config;
//! # use esp_hal::clock::CpuClock;
//! # use esp_hal::time::Rate;
//! # use embassy_executor::Spawner;
//! use cypress_touch_async::{config::Config as TouchConfig, touch::CypressTouch, Touchscreen};
//!
//! #[esp_hal_embassy::main]
//! async fn main(_spawner: Spawner) {
//!     let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
//!     let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100));
//!     let i2c = I2c::new(peripherals.I2C0, config)
//!         .unwrap()
//!         .with_sda(peripherals.GPIO13)
//!         .with_scl(peripherals.GPIO14)
//!         .into_async();
//!
//!     let int = Input::new(peripherals.GPIO12, InputConfig::default());
//!     let rts = Output::new(peripherals.GPIO45, Level::High, OutputConfig::default());
//!     let enable = Output::new(peripherals.GPIO39, Level::Low, OutputConfig::default());
//!
//!     let mut touch = CypressTouch::new(
//!         i2c,
//!         (int, rts, enable),
//!         embassy_time::Delay,
//!         TouchConfig::default(),
//!     )
//!     .unwrap();
//!     touch.init().await.unwrap();
//!
//!     loop {
//!         if let Ok(touches) = touch.read_touches().await {
//!             for touch in touches.iter() {
//!                 // log::info!("Touch: {:?}", touch);
//!             }
//!         }
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod error;
pub mod registers;
pub mod touch;
pub mod touchscreen;

#[cfg(test)]
mod mock;

pub use touchscreen::{TouchEvent, TouchPoint, Touches, Touchscreen};
