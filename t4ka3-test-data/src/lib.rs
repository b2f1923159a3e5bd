// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod i2c_mock;
mod pins;
mod sync_bus;

pub use i2c_mock::{
    I2cOperation, MockError, MockSensorBus, DEFAULT_I2C_ADDRESS, MAX_TRANSFER_LENGTH,
    T4KA3_PRODUCT_ID,
};
pub use pins::{MockDelay, MockPin, PinLevel};
pub use sync_bus::SyncSensorBus;
