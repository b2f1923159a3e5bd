// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::i2c;

/// The I²C address the simulated sensor answers on unless told otherwise.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x36;

/// The identity the T4KA3 reports in registers 0x0000 (high byte) and 0x0001 (low byte).
pub const T4KA3_PRODUCT_ID: u16 = 0x1490;

/// The largest single transfer (two address bytes plus payload) the sensor accepts.
pub const MAX_TRANSFER_LENGTH: usize = 32;

const PRODUCT_ID_HIGH: u16 = 0x0000;
const PRODUCT_ID_LOW: u16 = 0x0001;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// The requested transfer is malformed.
    ///
    /// This covers:
    /// * A write with fewer than two bytes (no register address).
    /// * A write-read that writes anything other than a two byte register address.
    /// * A write-read with a 0-length read.
    /// * Any transfer longer than [`MAX_TRANSFER_LENGTH`].
    IllegalOperation,

    /// The given register is read-only.
    IllegalWriteAddress(u16),

    /// The sensor did not acknowledge the transfer.
    Nack,
}

impl std::error::Error for MockError {}

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum I2cOperation {
    Write { address: u16, data: Vec<u8> },
    Read { address: u16, length: usize },
}

/// A register-map model of a T4KA3 sitting on an I²C bus.
///
/// The sensor uses 16-bit register addresses and 8-bit registers, with the address auto-incrementing
/// across a transfer. Every clone shares the same state, so a test can hand one clone to the driver
/// and keep another to look at what happened.
#[derive(Clone, Debug)]
pub struct MockSensorBus {
    i2c_address: u8,
    registers: Rc<RefCell<BTreeMap<u16, u8>>>,
    operations: Rc<RefCell<Vec<I2cOperation>>>,
    failing_transfers: Rc<Cell<usize>>,
    writes_fail: Rc<Cell<bool>>,
    misidentify_count: Rc<Cell<usize>>,
}

impl Default for MockSensorBus {
    fn default() -> Self {
        Self::new(DEFAULT_I2C_ADDRESS)
    }
}

impl MockSensorBus {
    pub fn new(i2c_address: u8) -> Self {
        let bus = Self {
            i2c_address,
            registers: Rc::new(RefCell::new(BTreeMap::new())),
            operations: Rc::new(RefCell::new(Vec::new())),
            failing_transfers: Rc::new(Cell::new(0)),
            writes_fail: Rc::new(Cell::new(false)),
            misidentify_count: Rc::new(Cell::new(0)),
        };
        bus.set_product_id(T4KA3_PRODUCT_ID);
        bus
    }

    pub fn i2c_address(&self) -> u8 {
        self.i2c_address
    }

    /// Replace the identity reported by the product ID registers.
    pub fn set_product_id(&self, product_id: u16) {
        let [high, low] = product_id.to_be_bytes();
        let mut registers = self.registers.borrow_mut();
        registers.insert(PRODUCT_ID_HIGH, high);
        registers.insert(PRODUCT_ID_LOW, low);
    }

    /// The current value of an 8-bit register. Registers never written read as 0.
    pub fn register(&self, address: u16) -> u8 {
        self.registers
            .borrow()
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    /// The current value of a big-endian 16-bit register pair starting at `address`.
    pub fn register_u16(&self, address: u16) -> u16 {
        u16::from_be_bytes([self.register(address), self.register(address + 1)])
    }

    /// Set a register directly, bypassing the bus (and the operation log).
    pub fn set_register(&self, address: u16, value: u8) {
        self.registers.borrow_mut().insert(address, value);
    }

    /// Make the next `count` transfers (of any kind) fail with [`MockError::Nack`].
    ///
    /// This simulates a transient bus fault; the failed transfers are not logged.
    pub fn fail_next_transfers(&self, count: usize) {
        self.failing_transfers.set(count);
    }

    /// Make every write fail with [`MockError::Nack`] until turned back off.
    pub fn set_writes_fail(&self, fail: bool) {
        self.writes_fail.set(fail);
    }

    /// Make the next `count` reads of the high product ID byte return 0.
    ///
    /// This looks like a sensor that lost power and came back without its identity registers
    /// being readable yet.
    pub fn misidentify_next(&self, count: usize) {
        self.misidentify_count.set(count);
    }

    pub fn operations(&self) -> Ref<Vec<I2cOperation>> {
        self.operations.borrow()
    }

    pub fn clear_operations(&self) {
        self.operations.borrow_mut().clear()
    }

    /// Every register byte written, in order, flattened out of any burst transfers.
    pub fn written_registers(&self) -> Vec<(u16, u8)> {
        self.operations
            .borrow()
            .iter()
            .filter_map(|operation| match operation {
                I2cOperation::Write { address, data } => Some((*address, data)),
                I2cOperation::Read { .. } => None,
            })
            .flat_map(|(address, data)| {
                data.iter()
                    .enumerate()
                    .map(move |(offset, value)| (address + offset as u16, *value))
            })
            .collect()
    }

    /// The number of write transfers performed.
    pub fn write_count(&self) -> usize {
        self.operations
            .borrow()
            .iter()
            .filter(|operation| matches!(operation, I2cOperation::Write { .. }))
            .count()
    }

    fn check_fault(&self) -> Result<(), MockError> {
        let remaining = self.failing_transfers.get();
        if remaining > 0 {
            self.failing_transfers.set(remaining - 1);
            Err(MockError::Nack)
        } else {
            Ok(())
        }
    }

    fn check_i2c_address(&self, i2c_address: u8) -> Result<(), MockError> {
        if i2c_address == self.i2c_address {
            Ok(())
        } else {
            Err(MockError::UnknownI2cAddress(i2c_address))
        }
    }

    fn read_byte(&self, address: u16) -> u8 {
        if address == PRODUCT_ID_HIGH {
            let remaining = self.misidentify_count.get();
            if remaining > 0 {
                self.misidentify_count.set(remaining - 1);
                return 0;
            }
        }
        self.register(address)
    }
}

fn extract_address(bytes: &[u8]) -> Result<u16, MockError> {
    match bytes {
        [high, low, ..] => Ok(u16::from_be_bytes([*high, *low])),
        _ => Err(MockError::IllegalOperation),
    }
}

impl i2c::Write for MockSensorBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_i2c_address(i2c_address)?;
        if bytes.len() > MAX_TRANSFER_LENGTH {
            return Err(MockError::IllegalOperation);
        }
        let address = extract_address(bytes)?;
        self.check_fault()?;
        if self.writes_fail.get() {
            return Err(MockError::Nack);
        }
        let payload = &bytes[2..];
        let end_address = address as usize + payload.len();
        // The identity registers are read-only.
        if (address as usize) <= PRODUCT_ID_LOW as usize && end_address > PRODUCT_ID_HIGH as usize
        {
            return Err(MockError::IllegalWriteAddress(address));
        }
        {
            let mut registers = self.registers.borrow_mut();
            for (offset, value) in payload.iter().enumerate() {
                registers.insert(address + offset as u16, *value);
            }
        }
        self.operations.borrow_mut().push(I2cOperation::Write {
            address,
            data: payload.to_vec(),
        });
        Ok(())
    }
}

impl i2c::WriteRead for MockSensorBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_i2c_address(i2c_address)?;
        // Write-reads should only be writing the address, so write_buffer should only be two bytes
        if write_buffer.len() != 2
            || out_buffer.is_empty()
            || out_buffer.len() > MAX_TRANSFER_LENGTH
        {
            return Err(MockError::IllegalOperation);
        }
        let address = extract_address(write_buffer)?;
        self.check_fault()?;
        self.operations.borrow_mut().push(I2cOperation::Read {
            address,
            length: out_buffer.len(),
        });
        for (offset, out) in out_buffer.iter_mut().enumerate() {
            *out = self.read_byte(address + offset as u16);
        }
        Ok(())
    }
}
