// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use embedded_hal::blocking::i2c;

use crate::i2c_mock::{MockError, DEFAULT_I2C_ADDRESS, MAX_TRANSFER_LENGTH, T4KA3_PRODUCT_ID};

#[derive(Debug, Default)]
struct BusState {
    registers: BTreeMap<u16, u8>,
    /// Every register byte written, flattened out of bursts.
    writes: Vec<(u16, u8)>,
}

/// A simulated T4KA3 that can be moved between threads.
///
/// It is a simpler cousin of [`MockSensorBus`][crate::MockSensorBus] with the state behind an
/// `Arc<Mutex<_>>`: no fault injection, and only the written bytes are logged. Every clone shares
/// the same state.
#[derive(Clone, Debug)]
pub struct SyncSensorBus {
    state: Arc<Mutex<BusState>>,
}

impl Default for SyncSensorBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncSensorBus {
    pub fn new() -> Self {
        let mut state = BusState::default();
        let [high, low] = T4KA3_PRODUCT_ID.to_be_bytes();
        state.registers.insert(0x0000, high);
        state.registers.insert(0x0001, low);
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        // A panicking test thread shouldn't hide what was written before it
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, address: u16) -> u8 {
        self.state()
            .registers
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    /// Every register byte written so far, in order.
    pub fn written_registers(&self) -> Vec<(u16, u8)> {
        self.state().writes.clone()
    }
}

impl i2c::Write for SyncSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if i2c_address != DEFAULT_I2C_ADDRESS {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        let (address, payload) = match bytes {
            [high, low, payload @ ..] if bytes.len() <= MAX_TRANSFER_LENGTH => {
                (u16::from_be_bytes([*high, *low]), payload)
            }
            _ => return Err(MockError::IllegalOperation),
        };
        if address <= 0x0001 {
            return Err(MockError::IllegalWriteAddress(address));
        }
        let mut state = self.state();
        for (offset, value) in payload.iter().enumerate() {
            let register = address + offset as u16;
            state.registers.insert(register, *value);
            state.writes.push((register, *value));
        }
        Ok(())
    }
}

impl i2c::WriteRead for SyncSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if i2c_address != DEFAULT_I2C_ADDRESS {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        let address = match write_buffer {
            [high, low] => u16::from_be_bytes([*high, *low]),
            _ => return Err(MockError::IllegalOperation),
        };
        let state = self.state();
        for (offset, out) in out_buffer.iter_mut().enumerate() {
            *out = state
                .registers
                .get(&(address + offset as u16))
                .copied()
                .unwrap_or_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use embedded_hal::blocking::i2c::{Write, WriteRead};

    use super::*;

    #[test]
    fn shared_between_threads() {
        let bus = SyncSensorBus::new();
        let mut writer = bus.clone();
        thread::spawn(move || {
            writer
                .write(DEFAULT_I2C_ADDRESS, &[0x02, 0x02, 0x01, 0x00])
                .unwrap()
        })
        .join()
        .unwrap();
        assert_eq!(bus.written_registers(), [(0x0202, 0x01), (0x0203, 0x00)]);
        let mut reader = bus.clone();
        let mut id = [0u8; 2];
        reader
            .write_read(DEFAULT_I2C_ADDRESS, &[0x00, 0x00], &mut id)
            .unwrap();
        assert_eq!(u16::from_be_bytes(id), T4KA3_PRODUCT_ID);
    }

    #[test]
    fn identity_is_read_only() {
        let mut bus = SyncSensorBus::new();
        assert_eq!(
            bus.write(DEFAULT_I2C_ADDRESS, &[0x00, 0x01, 0xFF]),
            Err(MockError::IllegalWriteAddress(0x0001))
        );
        assert_eq!(bus.register(0x0001), 0x90);
    }
}
