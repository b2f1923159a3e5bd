// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::i2c_mock::MockError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

/// An output pin that remembers every level it was driven to.
///
/// Like [`MockSensorBus`][crate::MockSensorBus], clones share their state.
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    transitions: Rc<RefCell<Vec<PinLevel>>>,
    fail: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every level the pin has been set to, oldest first.
    pub fn transitions(&self) -> Ref<Vec<PinLevel>> {
        self.transitions.borrow()
    }

    /// The most recent level, or `None` if the pin has never been driven.
    pub fn level(&self) -> Option<PinLevel> {
        self.transitions.borrow().last().copied()
    }

    /// Make every subsequent level change fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.set(fail);
    }

    fn drive(&self, level: PinLevel) -> Result<(), MockError> {
        if self.fail.get() {
            return Err(MockError::Nack);
        }
        self.transitions.borrow_mut().push(level);
        Ok(())
    }
}

impl OutputPin for MockPin {
    type Error = MockError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(PinLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(PinLevel::High)
    }
}

/// A delay provider that records the requested waits instead of sleeping.
#[derive(Clone, Debug, Default)]
pub struct MockDelay {
    calls: Rc<RefCell<Vec<u16>>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Ref<Vec<u16>> {
        self.calls.borrow()
    }

    pub fn total_ms(&self) -> u32 {
        self.calls.borrow().iter().map(|ms| u32::from(*ms)).sum()
    }
}

impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.calls.borrow_mut().push(ms);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pin_records_levels() {
        let mut pin = MockPin::new();
        let observer = pin.clone();
        assert_eq!(observer.level(), None);
        pin.set_high().unwrap();
        pin.set_low().unwrap();
        assert_eq!(*observer.transitions(), [PinLevel::High, PinLevel::Low]);
        assert_eq!(observer.level(), Some(PinLevel::Low));
    }

    #[test]
    fn failing_pin() {
        let mut pin = MockPin::new();
        pin.set_fail(true);
        assert_eq!(pin.set_high(), Err(MockError::Nack));
        assert!(pin.transitions().is_empty());
    }

    #[test]
    fn delay_totals() {
        let mut delay = MockDelay::new();
        delay.delay_ms(5);
        delay.delay_ms(20);
        assert_eq!(*delay.calls(), [5, 20]);
        assert_eq!(delay.total_ms(), 25);
    }
}
