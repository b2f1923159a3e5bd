// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Sharing one sensor between threads.
//!
//! Every operation on a [`T4ka3`] takes `&mut self`, so configuration and stream changes are
//! already serialized within a thread. [`SharedSensor`] wraps the driver in a mutex so that
//! several threads (a control thread and a capture thread, say) can drive the same sensor.
use core::fmt::Debug;
use std::sync::{Mutex, MutexGuard};

use embedded_hal::blocking::i2c;

use crate::controls::{ControlId, Format};
use crate::driver::T4ka3;
use crate::error::{Error, LibraryError};
use crate::mode::Mode;

#[derive(Debug)]
pub struct SharedSensor<I2C> {
    sensor: Mutex<T4ka3<I2C>>,
}

impl<I2C> SharedSensor<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: Debug,
    <I2C as i2c::Write>::Error: Debug,
{
    pub fn new(sensor: T4ka3<I2C>) -> Self {
        Self {
            sensor: Mutex::new(sensor),
        }
    }

    /// Lock the sensor for a series of operations.
    ///
    /// A thread panicking while holding the lock leaves the sensor in an unknown state, so a
    /// poisoned lock is reported as an error instead of being handed out.
    pub fn lock(&self) -> Result<MutexGuard<'_, T4ka3<I2C>>, LibraryError> {
        self.sensor
            .lock()
            .map_err(|_| LibraryError::ConfigInconsistent("sensor lock poisoned"))
    }

    /// Run `f` with the sensor locked.
    pub fn with<F, T>(&self, f: F) -> Result<T, Error<I2C>>
    where
        F: FnOnce(&mut T4ka3<I2C>) -> Result<T, Error<I2C>>,
    {
        let mut sensor = self.lock()?;
        f(&mut sensor)
    }

    pub fn set_format(&self, width: u32, height: u32) -> Result<&'static Mode, Error<I2C>> {
        self.with(|sensor| sensor.set_format(width, height))
    }

    pub fn get_active_format(&self) -> Result<Format, Error<I2C>> {
        self.with(|sensor| Ok(sensor.get_active_format()))
    }

    pub fn set_control(&self, control: ControlId, value: i64) -> Result<(), Error<I2C>> {
        self.with(|sensor| sensor.set_control(control, value))
    }

    pub fn set_exposure_and_gains(
        &self,
        exposure: u16,
        analog_gain: u16,
        digital_gain: u16,
    ) -> Result<(), Error<I2C>> {
        self.with(|sensor| sensor.set_exposure_and_gains(exposure, analog_gain, digital_gain))
    }

    pub fn start_stream(&self) -> Result<(), Error<I2C>> {
        self.with(T4ka3::start_stream)
    }

    pub fn stop_stream(&self) -> Result<(), Error<I2C>> {
        self.with(T4ka3::stop_stream)
    }

    pub fn into_inner(self) -> Result<T4ka3<I2C>, LibraryError> {
        self.sensor
            .into_inner()
            .map_err(|_| LibraryError::ConfigInconsistent("sensor lock poisoned"))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use t4ka3_test_data::{MockSensorBus, SyncSensorBus, DEFAULT_I2C_ADDRESS};

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    fn shared() -> (MockSensorBus, SharedSensor<MockSensorBus>) {
        let mocked = MockSensorBus::default();
        let sensor = T4ka3::new(mocked.clone(), DEFAULT_I2C_ADDRESS).unwrap();
        (mocked, SharedSensor::new(sensor))
    }

    #[test]
    fn forwards_to_sensor() {
        let (mocked, shared) = shared();
        shared.set_format(1920, 1080).unwrap();
        shared.start_stream().unwrap();
        assert_eq!(mocked.register(0x0100), 1);
        shared.set_control(ControlId::AnalogGain, 0x100).unwrap();
        assert_eq!(mocked.register_u16(0x0234), 0x100);
        assert!(matches!(
            shared.set_format(640, 480),
            Err(Error::LibraryError(LibraryError::Busy))
        ));
        shared.stop_stream().unwrap();
        let format = shared.get_active_format().unwrap();
        assert_eq!((format.width, format.height), (1936, 1096));
        let sensor = shared.into_inner().unwrap();
        assert!(!sensor.is_streaming());
    }

    #[test]
    fn with_runs_under_lock() {
        let (_, shared) = shared();
        let streaming = shared
            .with(|sensor| {
                sensor.start_stream()?;
                Ok(sensor.is_streaming())
            })
            .unwrap();
        assert!(streaming);
    }

    #[test]
    fn shareable_across_threads() {
        assert_send_sync::<SharedSensor<SyncSensorBus>>();
    }

    #[test]
    fn threads_only_see_whole_operations() {
        const FORMATS: [(u32, u32); 3] = [(736, 496), (1920, 1080), (3280, 2464)];
        let bus = SyncSensorBus::new();
        let sensor = T4ka3::new(bus.clone(), DEFAULT_I2C_ADDRESS).unwrap();
        let shared = Arc::new(SharedSensor::new(sensor));

        let streamer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for round in 0..24 {
                    let (width, height) = FORMATS[round % FORMATS.len()];
                    shared
                        .with(|sensor| {
                            sensor.stop_stream()?;
                            let mode = sensor.set_format(width, height)?;
                            sensor.start_stream()?;
                            assert!(sensor.is_streaming());
                            assert_eq!(sensor.active_mode().resolution(), mode.resolution());
                            Ok(())
                        })
                        .unwrap();
                }
            })
        };
        let tuner = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for step in 0..48u16 {
                    shared
                        .set_exposure_and_gains(100 + step, 0x100 + step, 0x100)
                        .unwrap();
                    shared
                        .set_control(ControlId::TestPattern, i64::from(step % 5))
                        .unwrap();
                }
            })
        };
        streamer.join().unwrap();
        tuner.join().unwrap();

        // Group holds never overlap, and streaming is only toggled outside of one
        let mut held = false;
        let mut streaming = false;
        for (address, value) in bus.written_registers() {
            match address {
                0x0104 => {
                    assert_eq!(held, value == 0, "group hold nested or unbalanced");
                    held = value == 1;
                }
                0x0100 => {
                    assert!(!held, "stream toggled under group hold");
                    assert_eq!(streaming, value == 0);
                    streaming = value == 1;
                }
                _ => {}
            }
        }
        assert!(!held);
        assert!(streaming);
        assert_eq!(bus.register(0x0100), 1);
        let format = shared.get_active_format().unwrap();
        assert_eq!((format.width, format.height), (3280, 2464));
    }
}
