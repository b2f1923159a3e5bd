// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust library for configuring and streaming from the Toshiba T4KA3 8MP camera sensor over
//! I²C.
//!
//! The T4KA3 is a raw Bayer sensor with a MIPI CSI-2 output. This crate doesn't handle the image
//! data itself; it takes care of the control side: identifying the sensor, choosing one of its
//! fixed modes, keeping track of exposure, gain, blanking and flip settings, and programming all of
//! that into the sensor when a stream starts.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C traits, meaning you should be able to
//! use this library on other platforms, as long as there's an `embedded-hal` I²C implementation
//! available. This library is also `no_std` compatible.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # Example
//! ```no_run
//! use t4ka3::{ControlId, T4ka3};
//! use linux_embedded_hal::I2cdev;
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! // Default address for the T4KA3 is 0x36
//! let mut sensor = T4ka3::new(i2c_bus, 0x36)?;
//! // Picks the closest mode that covers 1080p, 1936x1096
//! let mode = sensor.set_format(1920, 1080)?;
//! sensor.set_control(ControlId::AnalogGain, 0x200)?;
//! sensor.start_stream()?;
//! // Drop the first few frames, then capture from the CSI-2 receiver
//! # let _ = mode;
//! sensor.stop_stream()?;
//! # Ok::<(), t4ka3::Error<I2cdev>>(())
//! ```
//!
//! # Streaming and Idle
//! A sensor is either idle or streaming. While idle, format and control changes are only recorded;
//! nothing is written until [`start_stream`][T4ka3::start_stream] programs the whole
//! configuration. While streaming, control changes are written immediately, but format and flip
//! changes are refused with [`LibraryError::Busy`].
//!
//! # Low-Level API
//! The [`register`] module describes the sensor's registers, and [`codec`] packs register writes
//! into the burst transfers the sensor accepts. [`transport::RegisterBus`] does the actual bus
//! access, with retries.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod config;
pub mod controls;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod exposure;
pub mod mode;
pub mod power;
pub mod register;
#[cfg(feature = "std")]
pub mod shared;
pub mod tables;
pub mod transport;
mod util;

#[doc(inline)]
pub use config::SensorConfig;
pub use controls::{BayerOrder, ControlId, Controls, Flip, Format, TestPattern};
#[doc(inline)]
pub use driver::{SensorState, T4ka3, DEFAULT_ADDRESS, PRODUCT_ID};
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use exposure::ControlRange;
pub use mode::{Mode, ModeTable};
pub use power::PowerControl;
#[cfg(feature = "std")]
#[doc(inline)]
pub use shared::SharedSensor;
