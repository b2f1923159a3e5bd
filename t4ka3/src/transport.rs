// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Register access over I²C.
//!
//! [`RegisterBus`] owns the bus and the sensor's I²C address, and retries transient bus failures a
//! bounded number of times before giving up.
use core::fmt::Debug;

use embedded_hal::blocking::i2c;
use log::debug;

use crate::codec::{self, Burst, BurstWrite};
use crate::error::Error;
use crate::register::{merge_masked, Address, Register, RegisterOp, RegisterWidth};
use crate::util::Buffer;

/// The number of extra attempts made for a failed transfer when nothing else is configured.
pub const DEFAULT_RETRIES: u8 = 3;

#[derive(Clone, Debug)]
pub struct RegisterBus<I2C> {
    /// The I²C bus the sensor is accessible on.
    bus: I2C,

    /// The I²C address the sensor is accessible at.
    address: u8,

    /// How many times a failed transfer is retried before the error is surfaced.
    retries: u8,
}

impl<I2C> RegisterBus<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: Debug,
    <I2C as i2c::Write>::Error: Debug,
{
    pub fn new(bus: I2C, address: u8, retries: u8) -> Self {
        Self {
            bus,
            address,
            retries,
        }
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.bus
    }

    /// Read a register of the given width.
    pub fn read(&mut self, address: Address, width: RegisterWidth) -> Result<u32, Error<I2C>> {
        let mut buf = [0u8; 2];
        let buf = &mut buf[..width.bytes()];
        let register_address = address.as_bytes();
        let (bus, i2c_address) = (&mut self.bus, self.address);
        with_retries(self.retries, || {
            bus.write_read(i2c_address, &register_address, &mut buf[..])
        })
        .map_err(Error::I2cWriteReadError)?;
        let mut bytes: &[u8] = buf;
        Ok(match width {
            RegisterWidth::Eight => u32::from(bytes.get_u8()),
            RegisterWidth::Sixteen => u32::from(bytes.get_u16()),
        })
    }

    /// Write `value` to a register of the given width.
    ///
    /// Fails with [`InvalidData`][crate::LibraryError::InvalidData] if the value does not fit.
    pub fn write(
        &mut self,
        address: Address,
        width: RegisterWidth,
        value: u32,
    ) -> Result<(), Error<I2C>> {
        let op = RegisterOp::new(address, width, value)?;
        self.write_sequence(&[op])
    }

    /// Write a sequence of registers, in order, coalescing neighbouring registers into bursts.
    pub fn write_sequence(&mut self, sequence: &[RegisterOp]) -> Result<(), Error<I2C>> {
        codec::write_sequence(self, sequence)
    }

    /// Read one of the typed 8-bit registers.
    pub fn read_register<R: Register>(&mut self) -> Result<R, Error<I2C>> {
        let raw = self.read(R::address(), RegisterWidth::Eight)?;
        Ok(R::from(raw as u8))
    }

    /// Update one of the typed 8-bit registers, keeping any bits outside of its write mask.
    pub fn update_register<R: Register>(&mut self, register: R) -> Result<(), Error<I2C>> {
        let current = self.read(R::address(), RegisterWidth::Eight)? as u8;
        let merged = merge_masked(current, register);
        self.write(R::address(), RegisterWidth::Eight, u32::from(merged))
    }
}

impl<I2C> BurstWrite for RegisterBus<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::Write>::Error: Debug,
{
    type Error = Error<I2C>;

    fn write_burst(&mut self, burst: &Burst) -> Result<(), Self::Error> {
        let (bus, i2c_address) = (&mut self.bus, self.address);
        with_retries(self.retries, || bus.write(i2c_address, burst.as_bytes()))
            .map_err(Error::I2cWriteError)
    }
}

/// Run `transfer`, retrying up to `retries` more times if it fails.
fn with_retries<T, E, F>(retries: u8, mut transfer: F) -> Result<T, E>
where
    E: Debug,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        match transfer() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries => {
                attempt += 1;
                debug!("I²C transfer failed ({:?}), retry {} of {}", err, attempt, retries);
            }
            Err(err) => return Err(err),
        }
    }
}
