// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use log::debug;

use crate::error::LibraryError;

/// How long to wait before releasing the power-down line.
pub const POWER_UP_SETTLE_MS: u16 = 5;

/// How long the sensor needs after leaving power-down before it answers on the bus.
pub const POWER_UP_WAKE_MS: u16 = 20;

/// Drives the sensor's power-down line.
///
/// The line is treated as active high: driving it high powers the sensor down. Boards that wire it
/// active low should hand in an inverted pin.
#[derive(Debug)]
pub struct PowerControl<P, D> {
    powerdown: P,
    delay: D,
    powered: bool,
}

impl<P, D> PowerControl<P, D>
where
    P: OutputPin,
    D: DelayMs<u16>,
{
    /// Take control of the power-down line. The sensor is assumed to be powered up.
    pub fn new(powerdown: P, delay: D) -> Self {
        Self {
            powerdown,
            delay,
            powered: true,
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Assert power-down.
    pub fn power_down(&mut self) -> Result<(), LibraryError> {
        self.powerdown
            .set_high()
            .map_err(|_| LibraryError::PowerControl("unable to assert power-down"))?;
        self.powered = false;
        debug!("T4KA3 powered down");
        Ok(())
    }

    /// Release power-down and wait for the sensor to wake up.
    pub fn power_up(&mut self) -> Result<(), LibraryError> {
        self.delay.delay_ms(POWER_UP_SETTLE_MS);
        self.powerdown
            .set_low()
            .map_err(|_| LibraryError::PowerControl("unable to release power-down"))?;
        self.delay.delay_ms(POWER_UP_WAKE_MS);
        self.powered = true;
        debug!("T4KA3 powered up");
        Ok(())
    }

    /// Give the pin and delay back.
    pub fn release(self) -> (P, D) {
        (self.powerdown, self.delay)
    }
}

#[cfg(test)]
mod test {
    use t4ka3_test_data::{MockDelay, MockPin, PinLevel};

    use super::*;

    #[test]
    fn power_up_waits_around_release() {
        let pin = MockPin::new();
        let delay = MockDelay::new();
        let mut power = PowerControl::new(pin.clone(), delay.clone());
        power.power_down().unwrap();
        assert!(!power.is_powered());
        assert!(delay.calls().is_empty());
        power.power_up().unwrap();
        assert!(power.is_powered());
        assert_eq!(*pin.transitions(), [PinLevel::High, PinLevel::Low]);
        assert_eq!(*delay.calls(), [5, 20]);
    }

    #[test]
    fn pin_failures_are_reported() {
        let pin = MockPin::new();
        pin.set_fail(true);
        let mut power = PowerControl::new(pin, MockDelay::new());
        assert!(matches!(
            power.power_down(),
            Err(LibraryError::PowerControl(_))
        ));
        assert!(power.is_powered());
    }
}
