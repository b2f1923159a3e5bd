// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::fmt;

use embedded_hal::blocking::i2c;

use crate::controls::ControlId;

/// Errors that don't involve I²C.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LibraryError {
    /// The identity registers did not hold the T4KA3 product ID.
    ///
    /// The value actually read is included; a sensor that is powered down or absent usually reads
    /// as 0.
    NotFound(u16),

    /// The operation is not allowed while the sensor is streaming.
    Busy,

    /// The control does not exist on this sensor, or cannot be written.
    InvalidControl(ControlId),

    /// The value is outside of the control's current range.
    OutOfRange { control: ControlId, value: i64 },

    /// An internal invariant was broken. This is a bug, not a recoverable condition.
    ConfigInconsistent(&'static str),

    /// When a value (from the sensor or from a property string) is malformed in some way.
    InvalidData(&'static str),

    /// The power-down line could not be driven.
    PowerControl(&'static str),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::NotFound(id) => {
                write!(f, "unexpected product ID {:#06X}, sensor not found", id)
            }
            LibraryError::Busy => write!(f, "sensor is streaming"),
            LibraryError::InvalidControl(control) => {
                write!(f, "{:?} cannot be set on this sensor", control)
            }
            LibraryError::OutOfRange { control, value } => {
                write!(f, "{} is out of range for {:?}", value, control)
            }
            LibraryError::ConfigInconsistent(msg) => write!(f, "{}", msg),
            LibraryError::InvalidData(msg) => write!(f, "{}", msg),
            LibraryError::PowerControl(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LibraryError {}

pub enum Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Errors from reading registers over I²C.
    I2cWriteReadError(<I2C as i2c::WriteRead>::Error),

    /// Errors from writing registers over I²C.
    I2cWriteError(<I2C as i2c::Write>::Error),

    /// Errors originating from within this library.
    LibraryError(LibraryError),
}

impl<I2C> Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// `true` if this error came from the bus rather than from the driver's own checks.
    pub fn is_bus_error(&self) -> bool {
        !matches!(self, Error::LibraryError(_))
    }
}

// Custom Debug implementation so that I2C doesn't need to implement Debug (like the one from
// linux-embedded-hal).
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => f
                .debug_tuple("Error::I2cWriteReadError")
                .field(i2c_error)
                .finish(),
            Error::I2cWriteError(i2c_error) => f
                .debug_tuple("Error::I2cWriteError")
                .field(i2c_error)
                .finish(),
            Error::LibraryError(err) => f.debug_tuple("Error::LibraryError").field(err).finish(),
        }
    }
}

impl<I2C> fmt::Display for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => write!(f, "I2C read error: {:?}", i2c_error),
            Error::I2cWriteError(i2c_error) => write!(f, "I2C write error: {:?}", i2c_error),
            Error::LibraryError(err) => write!(f, "Library Error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: std::error::Error + 'static,
    <I2C as i2c::Write>::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2cWriteReadError(i2c_error) => Some(i2c_error),
            Error::I2cWriteError(i2c_error) => Some(i2c_error),
            Error::LibraryError(lib_err) => Some(lib_err),
        }
    }
}

impl<I2C> From<LibraryError> for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    fn from(lib_err: LibraryError) -> Self {
        Self::LibraryError(lib_err)
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::string::ToString;

    use t4ka3_test_data::{MockError, MockSensorBus};

    use super::*;

    #[test]
    fn library_error_display() {
        assert_eq!(
            LibraryError::NotFound(0).to_string(),
            "unexpected product ID 0x0000, sensor not found"
        );
        assert_eq!(
            LibraryError::OutOfRange {
                control: ControlId::AnalogGain,
                value: 4096
            }
            .to_string(),
            "4096 is out of range for AnalogGain"
        );
    }

    #[test]
    fn bus_errors() {
        let write: Error<MockSensorBus> = Error::I2cWriteError(MockError::Nack);
        let lib: Error<MockSensorBus> = LibraryError::Busy.into();
        assert!(write.is_bus_error());
        assert!(!lib.is_bus_error());
        assert_eq!(write.to_string(), "I2C write error: Nack");
    }
}
