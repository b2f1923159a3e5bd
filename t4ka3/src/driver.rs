// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use core::fmt::Debug;

use arrayvec::ArrayVec;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use embedded_hal::digital::v2::OutputPin;
use log::{debug, error, info, warn};
use paste::paste;

use crate::config::SensorConfig;
use crate::controls::*;
use crate::error::{Error, LibraryError};
use crate::exposure::*;
use crate::mode::{Mode, ModeTable};
use crate::power::PowerControl;
use crate::register::*;
use crate::tables::INIT_SEQUENCE;
use crate::transport::RegisterBus;

/// The value of the product ID registers on a T4KA3.
pub const PRODUCT_ID: u16 = 0x1490;

/// The usual I²C address of a T4KA3.
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// The most register writes a single control update turns into, group hold included.
const MAX_COMMIT_WRITES: usize = 8;

/// DRY macro for the typed set_* shortcuts in `T4ka3` that forward to `set_control`.
macro_rules! set_control_value {
    { $name:ident, $control:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn [< set_ $name >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            self.set_control(ControlId::$control, i64::from(new_value))
        }
    }};
}

/// Where the sensor is in its lifecycle, along with the mode it is (or will be) streaming in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SensorState {
    Idle(&'static Mode),
    Streaming(&'static Mode),
}

/// A driver for the Toshiba T4KA3 8MP raw Bayer camera sensor.
///
/// The driver keeps the sensor's configuration (mode and control values) in memory, and only
/// programs the sensor when a stream is started or when a control changes mid-stream. This means
/// the sensor can lose power while idle without losing any settings.
///
/// Mode changes are only allowed while idle, as are flips (they change the Bayer order of the
/// output).
#[derive(Debug)]
pub struct T4ka3<I2C> {
    /// Register access to the sensor.
    bus: RegisterBus<I2C>,

    /// The modes the sensor can be put in.
    modes: ModeTable,

    /// The mode the sensor is in, or will be in when next streaming.
    mode: &'static Mode,

    streaming: bool,

    /// Last set value of every writable control.
    controls: Controls,

    /// The board configuration the sensor was attached with.
    config: SensorConfig,
}

impl<I2C> T4ka3<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: Debug,
    <I2C as i2c::Write>::Error: Debug,
{
    /// Attach to a sensor at the given I²C address, using the default configuration.
    pub fn new(bus: I2C, address: u8) -> Result<Self, Error<I2C>> {
        Self::attach(bus, address, SensorConfig::default())
    }

    /// Attach to a sensor, checking that it is actually a T4KA3.
    ///
    /// The sensor starts out idle, in the first mode of the mode table.
    pub fn attach(bus: I2C, address: u8, config: SensorConfig) -> Result<Self, Error<I2C>> {
        Self::attach_with_modes(bus, address, config, ModeTable::default())
    }

    /// Attach to a sensor using a custom mode table.
    pub fn attach_with_modes(
        bus: I2C,
        address: u8,
        config: SensorConfig,
        modes: ModeTable,
    ) -> Result<Self, Error<I2C>> {
        let mode = modes.default_mode();
        let mut sensor = Self {
            bus: RegisterBus::new(bus, address, config.i2c_retries),
            modes,
            mode,
            streaming: false,
            controls: Controls::new(config.flip(), config.test_pattern, mode),
            config,
        };
        sensor.detect()?;
        Ok(sensor)
    }

    /// Stop streaming (if needed) and hand the bus back.
    ///
    /// The bus is always returned, along with the result of stopping the stream.
    pub fn detach(mut self) -> (I2C, Result<(), Error<I2C>>) {
        let result = self.stop_stream();
        if let Err(err) = &result {
            warn!("Failed to stop the stream while detaching: {:?}", err);
        }
        (self.bus.release(), result)
    }

    /// Check the product ID registers, returning the ID if it is a T4KA3.
    pub fn detect(&mut self) -> Result<u16, Error<I2C>> {
        let high = self.bus.read(PRODUCT_ID_HIGH, RegisterWidth::Eight)?;
        let low = self.bus.read(PRODUCT_ID_LOW, RegisterWidth::Eight)?;
        let product_id = ((high << 8) | low) as u16;
        if product_id != PRODUCT_ID {
            error!(
                "T4KA3 product ID mismatch: found {:#06X}, expected {:#06X}",
                product_id, PRODUCT_ID
            );
            return Err(LibraryError::NotFound(product_id).into());
        }
        info!("Detected T4KA3 (product ID {:#06X})", product_id);
        Ok(product_id)
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn state(&self) -> SensorState {
        if self.streaming {
            SensorState::Streaming(self.mode)
        } else {
            SensorState::Idle(self.mode)
        }
    }

    pub fn modes(&self) -> &ModeTable {
        &self.modes
    }

    /// The supported resolutions, in mode table order.
    pub fn enumerate_modes(&self) -> impl Iterator<Item = (u32, u32)> + 'static {
        self.modes.resolutions()
    }

    pub fn active_mode(&self) -> &'static Mode {
        self.mode
    }

    /// The format currently configured, including the Bayer order resulting from any flips.
    pub fn get_active_format(&self) -> Format {
        Format::new(self.mode, self.controls.flip)
    }

    /// The format [`set_format`][Self::set_format] would pick, without changing anything.
    pub fn try_format(&self, width: u32, height: u32) -> Format {
        Format::new(self.modes.nearest_mode(width, height), self.controls.flip)
    }

    /// Pick the mode nearest the requested resolution and make it the active mode.
    ///
    /// Nothing is written to the sensor until the next stream starts. Vertical blanking, exposure
    /// and gains are reset to their defaults for the new mode.
    pub fn set_format(&mut self, width: u32, height: u32) -> Result<&'static Mode, Error<I2C>> {
        if self.streaming {
            return Err(LibraryError::Busy.into());
        }
        let mode = self.modes.nearest_mode(width, height);
        self.mode = mode;
        self.controls.reset_for_mode(mode);
        info!(
            "Format set to {}x{} (requested {}x{})",
            mode.width(),
            mode.height(),
            width,
            height
        );
        Ok(mode)
    }

    /// The number of frames to drop after starting a stream before the output is valid.
    pub fn skip_frames(&self) -> u32 {
        self.mode.skip_frames()
    }

    /// The nominal frame interval, as a (numerator, denominator) fraction of a second.
    pub fn frame_interval(&self) -> (u32, u32) {
        (1, FRAMES_PER_SECOND)
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// The current value of a control.
    pub fn control(&self, control: ControlId) -> i64 {
        match control {
            ControlId::HorizontalFlip => i64::from(self.controls.flip.horizontal),
            ControlId::VerticalFlip => i64::from(self.controls.flip.vertical),
            ControlId::Exposure => i64::from(self.controls.exposure),
            ControlId::AnalogGain => i64::from(self.controls.analog_gain),
            ControlId::DigitalGain => i64::from(self.controls.digital_gain),
            ControlId::VerticalBlank => i64::from(self.controls.vblank),
            ControlId::TestPattern => i64::from(u8::from(self.controls.test_pattern)),
            ControlId::HorizontalBlank
            | ControlId::LinkFrequency
            | ControlId::PixelRate => self.control_range(control).default,
        }
    }

    /// The values a control currently accepts.
    ///
    /// The exposure, vertical blanking and horizontal blanking ranges depend on the active mode
    /// (and exposure on the vertical blanking as well).
    pub fn control_range(&self, control: ControlId) -> ControlRange {
        match control {
            ControlId::HorizontalFlip => ControlRange::new(0, 1, i64::from(self.config.hflip)),
            ControlId::VerticalFlip => ControlRange::new(0, 1, i64::from(self.config.vflip)),
            ControlId::Exposure => self.controls.exposure_range(self.mode),
            ControlId::AnalogGain => analog_gain_range(),
            ControlId::DigitalGain => digital_gain_range(),
            ControlId::VerticalBlank => vblank_range(self.mode.height()),
            ControlId::HorizontalBlank => hblank_range(self.mode.width()),
            ControlId::TestPattern => ControlRange::new(
                i64::from(u8::from(TestPattern::Disabled)),
                i64::from(u8::from(TestPattern::RandomData)),
                i64::from(u8::from(self.config.test_pattern)),
            ),
            ControlId::LinkFrequency => {
                ControlRange::fixed(i64::try_from(self.config.link_frequency).unwrap_or(i64::MAX))
            }
            ControlId::PixelRate => ControlRange::fixed(PIXEL_RATE as i64),
        }
    }

    /// Set a control.
    ///
    /// While idle only the stored value changes; it is written when the next stream starts. While
    /// streaming the sensor is updated immediately, except for flips which are refused with
    /// [`Busy`][LibraryError::Busy]. The stored value only changes once the sensor has accepted
    /// the new value.
    ///
    /// Changing the vertical blanking changes the exposure range. If the current exposure no
    /// longer fits it is clamped to the new maximum (and rewritten if streaming).
    pub fn set_control(&mut self, control: ControlId, value: i64) -> Result<(), Error<I2C>> {
        if control.is_read_only() {
            return Err(LibraryError::InvalidControl(control).into());
        }
        if control.modifies_layout() && self.streaming {
            return Err(LibraryError::Busy.into());
        }
        if !self.control_range(control).contains(value) {
            return Err(LibraryError::OutOfRange { control, value }.into());
        }
        debug!("Setting {:?} to {}", control, value);
        let mut next = self.controls;
        let mut changed: ArrayVec<ControlId, 2> = ArrayVec::new();
        changed.push(control);
        match control {
            ControlId::HorizontalFlip => next.flip.horizontal = value != 0,
            ControlId::VerticalFlip => next.flip.vertical = value != 0,
            ControlId::Exposure => next.exposure = saturate(value),
            ControlId::AnalogGain => next.analog_gain = saturate(value),
            ControlId::DigitalGain => next.digital_gain = saturate(value),
            ControlId::VerticalBlank => {
                next.vblank = saturate(value);
                let exposure_range = next.exposure_range(self.mode);
                let exposure = exposure_range.clamp(i64::from(next.exposure));
                if exposure != i64::from(next.exposure) {
                    debug!("Clamping exposure to {} lines", exposure);
                    next.exposure = saturate(exposure);
                    changed.push(ControlId::Exposure);
                }
            }
            ControlId::TestPattern => {
                next.test_pattern = u8::try_from(value)
                    .ok()
                    .and_then(|raw| TestPattern::try_from(raw).ok())
                    .ok_or(LibraryError::OutOfRange { control, value })?;
            }
            ControlId::HorizontalBlank | ControlId::LinkFrequency | ControlId::PixelRate => {
                return Err(LibraryError::InvalidControl(control).into());
            }
        }
        self.commit_controls(next, &changed, false)
    }

    set_control_value! { hflip, HorizontalFlip, bool, "Mirror the image horizontally. Only allowed while idle." }
    set_control_value! { vflip, VerticalFlip, bool, "Mirror the image vertically. Only allowed while idle." }
    set_control_value! { exposure, Exposure, u16, "Set the exposure time, in lines." }
    set_control_value! { analog_gain, AnalogGain, u16, "Set the analog gain." }
    set_control_value! { digital_gain, DigitalGain, u16, "Set the digital gain of every color channel." }
    set_control_value! { vblank, VerticalBlank, u16, "Set the vertical blanking, in lines." }

    /// Select one of the built in test patterns.
    pub fn set_test_pattern(&mut self, pattern: TestPattern) -> Result<(), Error<I2C>> {
        debug!("Selecting the '{}' test pattern", pattern.name());
        self.set_control(ControlId::TestPattern, i64::from(u8::from(pattern)))
    }

    /// Set exposure, analog gain and digital gain together.
    ///
    /// All three values are checked before anything is changed. While streaming they are written
    /// under group hold, so the sensor applies them to the same frame.
    pub fn set_exposure_and_gains(
        &mut self,
        exposure: u16,
        analog_gain: u16,
        digital_gain: u16,
    ) -> Result<(), Error<I2C>> {
        const CHANGED: [ControlId; 3] = [
            ControlId::Exposure,
            ControlId::AnalogGain,
            ControlId::DigitalGain,
        ];
        for (control, value) in CHANGED.into_iter().zip([exposure, analog_gain, digital_gain]) {
            let value = i64::from(value);
            if !self.control_range(control).contains(value) {
                return Err(LibraryError::OutOfRange { control, value }.into());
            }
        }
        debug!(
            "Setting exposure to {}, analog gain to {:#06X}, digital gain to {:#06X}",
            exposure, analog_gain, digital_gain
        );
        let mut next = self.controls;
        next.exposure = exposure;
        next.analog_gain = analog_gain;
        next.digital_gain = digital_gain;
        self.commit_controls(next, &CHANGED, true)
    }

    /// Make `next` the stored control values, first writing any `changed` controls if streaming.
    ///
    /// If a write fails the stored values are left as they were.
    fn commit_controls(
        &mut self,
        next: Controls,
        changed: &[ControlId],
        group_hold: bool,
    ) -> Result<(), Error<I2C>> {
        if self.streaming {
            let mut writes: ArrayVec<RegisterOp, MAX_COMMIT_WRITES> = ArrayVec::new();
            if group_hold {
                writes.push(RegisterOp::byte_at(PARAM_HOLD, 1));
            }
            for control in changed {
                writes.extend(next.register_writes(*control, self.mode));
            }
            if group_hold {
                writes.push(RegisterOp::byte_at(PARAM_HOLD, 0));
            }
            self.bus.write_sequence(&writes)?;
        }
        self.controls = next;
        Ok(())
    }

    fn write_orientation(&mut self) -> Result<(), Error<I2C>> {
        let orientation: OrientationRegister = self.controls.flip.into();
        self.bus.update_register(orientation)
    }

    /// Program the sensor for the active mode and start streaming.
    ///
    /// The sensor is identified first. If that fails a single [`recover`][Self::recover] is
    /// attempted; if recovery fails too the original identification error is returned. Then the
    /// global init sequence, the mode's registers, and every stored control value are written
    /// under group hold before streaming is enabled.
    ///
    /// On any failure the sensor is left idle (though it may be partially programmed).
    pub fn start_stream(&mut self) -> Result<(), Error<I2C>> {
        if self.streaming {
            warn!("Stream already started");
            return Ok(());
        }
        if let Err(detect_err) = self.detect() {
            warn!("T4KA3 not responding before stream start, attempting recovery");
            if let Err(recover_err) = self.recover() {
                error!("T4KA3 recovery failed: {:?}", recover_err);
                return Err(detect_err);
            }
        }
        self.bus.write_sequence(&INIT_SEQUENCE)?;
        self.bus.write(PARAM_HOLD, RegisterWidth::Eight, 1)?;
        self.bus.write_sequence(self.mode.register_sequence())?;
        self.write_orientation()?;
        let replay = self.controls.replay_sequence(self.mode);
        self.bus.write_sequence(&replay)?;
        self.bus.write(PARAM_HOLD, RegisterWidth::Eight, 0)?;
        self.bus.write(STREAM, RegisterWidth::Eight, 1)?;
        self.streaming = true;
        info!(
            "Streaming {}x{} at {} fps",
            self.mode.width(),
            self.mode.height(),
            FRAMES_PER_SECOND
        );
        Ok(())
    }

    /// Stop streaming. Stopping an idle sensor does nothing.
    pub fn stop_stream(&mut self) -> Result<(), Error<I2C>> {
        if !self.streaming {
            warn!("Stream already stopped");
            return Ok(());
        }
        self.bus.write(STREAM, RegisterWidth::Eight, 0)?;
        self.streaming = false;
        info!("Stream stopped");
        Ok(())
    }

    /// Reprogram the orientation and the active mode's registers under group hold.
    ///
    /// This is what [`start_stream`][Self::start_stream] falls back on when the sensor fails to
    /// identify itself. It is a single attempt; retrying is up to the caller.
    pub fn recover(&mut self) -> Result<(), Error<I2C>> {
        self.bus.write(PARAM_HOLD, RegisterWidth::Eight, 1)?;
        self.write_orientation()?;
        self.bus.write_sequence(self.mode.register_sequence())?;
        self.bus.write(PARAM_HOLD, RegisterWidth::Eight, 0)?;
        info!("T4KA3 reprogrammed for {}x{}", self.mode.width(), self.mode.height());
        Ok(())
    }

    /// Power the sensor down. Refused with [`Busy`][LibraryError::Busy] while streaming.
    pub fn suspend<P, D>(&mut self, power: &mut PowerControl<P, D>) -> Result<(), Error<I2C>>
    where
        P: OutputPin,
        D: DelayMs<u16>,
    {
        if self.streaming {
            return Err(LibraryError::Busy.into());
        }
        power.power_down()?;
        Ok(())
    }

    /// Power the sensor back up and check that it answers, returning its product ID.
    pub fn resume<P, D>(&mut self, power: &mut PowerControl<P, D>) -> Result<u16, Error<I2C>>
    where
        P: OutputPin,
        D: DelayMs<u16>,
    {
        power.power_up()?;
        self.detect()
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use t4ka3_test_data::*;

    use super::*;

    fn attach() -> (MockSensorBus, T4ka3<MockSensorBus>) {
        let mocked = MockSensorBus::default();
        let sensor = T4ka3::new(mocked.clone(), DEFAULT_I2C_ADDRESS).unwrap();
        (mocked, sensor)
    }

    #[test]
    fn attach_identifies() {
        let (mocked, sensor) = attach();
        assert_eq!(sensor.state(), SensorState::Idle(&crate::tables::MODES[0]));
        assert_eq!(mocked.write_count(), 0);
    }

    #[test]
    fn attach_wrong_product() {
        let mocked = MockSensorBus::default();
        mocked.set_product_id(0x1234);
        let res = T4ka3::new(mocked, DEFAULT_I2C_ADDRESS);
        assert!(matches!(
            res,
            Err(Error::LibraryError(LibraryError::NotFound(0x1234)))
        ));
    }

    #[test]
    fn attach_bus_error() {
        let mocked = MockSensorBus::default();
        mocked.fail_next_transfers(usize::MAX);
        let res = T4ka3::new(mocked, DEFAULT_I2C_ADDRESS);
        assert!(matches!(res, Err(Error::I2cWriteReadError(MockError::Nack))));
    }

    #[test]
    fn set_format_idle_is_deferred() {
        let (mocked, mut sensor) = attach();
        let mode = sensor.set_format(1920, 1080).unwrap();
        assert_eq!(mode.resolution(), (1936, 1096));
        assert_eq!(sensor.active_mode().resolution(), (1936, 1096));
        assert_eq!(mocked.write_count(), 0);
        assert_eq!(
            sensor.controls().vblank(),
            (LINES_PER_FRAME - 1096) as u16
        );
    }

    #[test]
    fn try_format_changes_nothing() {
        let (_, sensor) = attach();
        let format = sensor.try_format(640, 480);
        assert_eq!((format.width, format.height), (896, 736));
        assert_eq!(format.bayer_order, BayerOrder::Sgrbg10);
        assert_eq!(sensor.active_mode().resolution(), (736, 496));
    }

    #[test]
    fn start_stream_programs_sensor() {
        let (mocked, mut sensor) = attach();
        sensor.set_hflip(true).unwrap();
        sensor.set_analog_gain(0x200).unwrap();
        mocked.set_register(0x0101, 0x80);
        sensor.start_stream().unwrap();
        assert!(sensor.is_streaming());
        let written = mocked.written_registers();
        assert_eq!(written[0], (0x4136, 0x13));
        let hold = written
            .iter()
            .position(|write| *write == (0x0104, 1))
            .unwrap();
        let mode_start = written
            .iter()
            .position(|write| *write == (0x034C, (736u16 >> 8) as u8))
            .unwrap();
        assert!(hold < mode_start);
        assert_eq!(written[written.len() - 2..], [(0x0104, 0), (0x0100, 1)]);
        // Reserved orientation bits are preserved
        assert_eq!(mocked.register(0x0101), 0x81);
        assert_eq!(mocked.register_u16(0x0234), 0x200);
        assert_eq!(mocked.register_u16(0x0340), LINES_PER_FRAME as u16);
        assert_eq!(
            sensor.get_active_format().bayer_order,
            BayerOrder::Srggb10
        );
    }

    #[test]
    fn start_stream_twice() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        sensor.start_stream().unwrap();
        assert!(mocked.operations().is_empty());
    }

    #[test]
    fn busy_while_streaming() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        assert!(matches!(
            sensor.set_format(3280, 2464),
            Err(Error::LibraryError(LibraryError::Busy))
        ));
        assert!(matches!(
            sensor.set_vflip(true),
            Err(Error::LibraryError(LibraryError::Busy))
        ));
        assert_eq!(sensor.active_mode().resolution(), (736, 496));
        assert!(!sensor.controls().flip().vertical);
        assert_eq!(mocked.write_count(), 0);
    }

    #[test]
    fn stop_stream() {
        let (mocked, mut sensor) = attach();
        sensor.stop_stream().unwrap();
        assert_eq!(mocked.write_count(), 0);
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        sensor.stop_stream().unwrap();
        assert!(!sensor.is_streaming());
        assert_eq!(mocked.written_registers(), [(0x0100, 0)]);
        // Formats can be changed again
        sensor.set_format(3280, 2464).unwrap();
    }

    #[test]
    fn controls_written_only_while_streaming() {
        let (mocked, mut sensor) = attach();
        sensor.set_exposure(100).unwrap();
        assert_eq!(mocked.write_count(), 0);
        sensor.start_stream().unwrap();
        assert_eq!(mocked.register_u16(0x0202), 100);
        mocked.clear_operations();
        sensor.set_exposure(200).unwrap();
        assert_eq!(mocked.written_registers(), [(0x0202, 0), (0x0203, 200)]);
    }

    #[test]
    fn digital_gain_is_one_burst() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        sensor.set_digital_gain(0x0234).unwrap();
        let expected: Vec<u8> = [0x02, 0x34].repeat(4);
        assert_eq!(
            *mocked.operations(),
            [I2cOperation::Write {
                address: 0x020E,
                data: expected
            }]
        );
    }

    #[test]
    fn vblank_clamps_exposure() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        let exposure_max = sensor.control_range(ControlId::Exposure).max;
        assert_eq!(exposure_max, i64::from(LINES_PER_FRAME - INTEGRATION_TIME_MARGIN));
        assert_eq!(i64::from(sensor.controls().exposure()), exposure_max);
        mocked.clear_operations();
        sensor.set_vblank(4).unwrap();
        assert_eq!(sensor.controls().exposure(), 496 + 4 - 6);
        assert_eq!(sensor.control_range(ControlId::Exposure).max, 494);
        assert_eq!(
            mocked.written_registers(),
            [(0x0340, 0x01), (0x0341, 0xF4), (0x0202, 0x01), (0x0203, 0xEE)]
        );
    }

    #[test]
    fn vblank_without_clamp() {
        let (mocked, mut sensor) = attach();
        sensor.set_exposure(10).unwrap();
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        sensor.set_vblank(100).unwrap();
        assert_eq!(sensor.controls().exposure(), 10);
        assert_eq!(mocked.write_count(), 1);
    }

    #[test]
    fn rejected_controls() {
        let (mocked, mut sensor) = attach();
        assert!(matches!(
            sensor.set_control(ControlId::PixelRate, PIXEL_RATE as i64),
            Err(Error::LibraryError(LibraryError::InvalidControl(
                ControlId::PixelRate
            )))
        ));
        assert!(matches!(
            sensor.set_analog_gain(0x7F),
            Err(Error::LibraryError(LibraryError::OutOfRange {
                control: ControlId::AnalogGain,
                value: 0x7F
            }))
        ));
        assert!(matches!(
            sensor.set_control(ControlId::TestPattern, 5),
            Err(Error::LibraryError(LibraryError::OutOfRange { .. }))
        ));
        assert_eq!(sensor.controls().analog_gain(), MIN_ANALOG_GAIN);
        assert_eq!(mocked.write_count(), 0);
    }

    #[test]
    fn read_only_values() {
        let (_, mut sensor) = attach();
        assert_eq!(sensor.control(ControlId::PixelRate), 257_174_400);
        assert_eq!(sensor.control(ControlId::LinkFrequency), 321_468_000);
        assert_eq!(sensor.control(ControlId::HorizontalBlank), 3440 - 736);
        sensor.set_format(3280, 2464).unwrap();
        assert_eq!(sensor.control(ControlId::HorizontalBlank), 160);
        assert_eq!(sensor.skip_frames(), 0);
        assert_eq!(sensor.frame_interval(), (1, 30));
    }

    #[test]
    fn test_pattern_control() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        sensor.set_test_pattern(TestPattern::Gradient).unwrap();
        assert_eq!(mocked.register(0x0601), 3);
        assert_eq!(sensor.control(ControlId::TestPattern), 3);
    }

    #[test]
    fn config_seeds_controls() {
        let mocked = MockSensorBus::default();
        let config = SensorConfig::parse("vflip; test-pattern=1").unwrap();
        let sensor = T4ka3::attach(mocked, DEFAULT_I2C_ADDRESS, config).unwrap();
        assert_eq!(sensor.get_active_format().bayer_order, BayerOrder::Sbggr10);
        assert_eq!(sensor.controls().test_pattern(), TestPattern::SolidWhite);
        assert_eq!(sensor.control_range(ControlId::VerticalFlip).default, 1);
    }

    #[test]
    fn start_stream_recovers() {
        let (mocked, mut sensor) = attach();
        mocked.misidentify_next(1);
        sensor.start_stream().unwrap();
        assert!(sensor.is_streaming());
    }

    #[test]
    fn start_stream_recovery_fails() {
        let (mocked, mut sensor) = attach();
        mocked.misidentify_next(1);
        mocked.set_writes_fail(true);
        let res = sensor.start_stream();
        assert!(matches!(
            res,
            Err(Error::LibraryError(LibraryError::NotFound(0x0090)))
        ));
        assert!(!sensor.is_streaming());
    }

    #[test]
    fn start_stream_write_failure_stays_idle() {
        let (mocked, mut sensor) = attach();
        mocked.set_writes_fail(true);
        assert!(matches!(
            sensor.start_stream(),
            Err(Error::I2cWriteError(MockError::Nack))
        ));
        assert!(!sensor.is_streaming());
    }

    #[test]
    fn transient_faults_are_retried() {
        let (mocked, mut sensor) = attach();
        mocked.fail_next_transfers(2);
        sensor.start_stream().unwrap();
        assert!(sensor.is_streaming());
    }

    #[test]
    fn suspend_and_resume() {
        let (_, mut sensor) = attach();
        let pin = MockPin::new();
        let mut power = PowerControl::new(pin.clone(), MockDelay::new());
        sensor.start_stream().unwrap();
        assert!(matches!(
            sensor.suspend(&mut power),
            Err(Error::LibraryError(LibraryError::Busy))
        ));
        sensor.stop_stream().unwrap();
        sensor.suspend(&mut power).unwrap();
        assert_eq!(pin.level(), Some(PinLevel::High));
        assert_eq!(sensor.resume(&mut power).unwrap(), PRODUCT_ID);
        assert_eq!(pin.level(), Some(PinLevel::Low));
    }

    #[test]
    fn detach_stops_stream() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        let (bus, res) = sensor.detach();
        assert!(res.is_ok());
        assert_eq!(bus.register(0x0100), 0);
        assert_eq!(mocked.register(0x0100), 0);
    }

    #[test]
    fn failed_writes_keep_stored_values() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        mocked.set_writes_fail(true);
        assert!(matches!(
            sensor.set_analog_gain(0x400),
            Err(Error::I2cWriteError(MockError::Nack))
        ));
        assert_eq!(sensor.control(ControlId::AnalogGain), i64::from(MIN_ANALOG_GAIN));
        assert_eq!(mocked.register_u16(0x0234), MIN_ANALOG_GAIN);

        assert!(sensor.set_vblank(4).is_err());
        assert_eq!(sensor.controls().vblank(), (LINES_PER_FRAME - 496) as u16);
        assert_eq!(sensor.controls().exposure(), 2486);
        assert_eq!(sensor.control_range(ControlId::Exposure).max, 2486);
        assert_eq!(mocked.register_u16(0x0340), LINES_PER_FRAME as u16);
        assert_eq!(mocked.register_u16(0x0202), 2486);

        mocked.set_writes_fail(false);
        sensor.set_vblank(4).unwrap();
        assert_eq!(sensor.controls().vblank(), 4);
        assert_eq!(sensor.controls().exposure(), 494);
        assert_eq!(mocked.register_u16(0x0202), 494);
    }

    #[test]
    fn flip_busy_before_range_check() {
        let (_, mut sensor) = attach();
        assert!(matches!(
            sensor.set_control(ControlId::HorizontalFlip, 2),
            Err(Error::LibraryError(LibraryError::OutOfRange { .. }))
        ));
        sensor.start_stream().unwrap();
        assert!(matches!(
            sensor.set_control(ControlId::HorizontalFlip, 2),
            Err(Error::LibraryError(LibraryError::Busy))
        ));
    }

    #[test]
    fn exposure_and_gains_together() {
        let (mocked, mut sensor) = attach();
        sensor.set_exposure_and_gains(100, 0x100, 0x200).unwrap();
        assert_eq!(mocked.write_count(), 0);
        assert_eq!(sensor.controls().exposure(), 100);

        sensor.start_stream().unwrap();
        assert_eq!(mocked.register_u16(0x0212), 0x200);
        mocked.clear_operations();
        sensor.set_exposure_and_gains(300, 0x200, 0x180).unwrap();
        let mut expected: Vec<(u16, u8)> = vec![
            (0x0104, 1),
            (0x0202, 0x01),
            (0x0203, 0x2C),
            (0x0234, 0x02),
            (0x0235, 0x00),
        ];
        for channel in 0..4u16 {
            expected.push((0x020E + channel * 2, 0x01));
            expected.push((0x020F + channel * 2, 0x80));
        }
        expected.push((0x0104, 0));
        assert_eq!(mocked.written_registers(), expected);
        assert_eq!(sensor.control(ControlId::DigitalGain), 0x180);
    }

    #[test]
    fn exposure_and_gains_rejects_before_writing() {
        let (mocked, mut sensor) = attach();
        sensor.start_stream().unwrap();
        mocked.clear_operations();
        assert!(matches!(
            sensor.set_exposure_and_gains(300, 0x200, 0x50),
            Err(Error::LibraryError(LibraryError::OutOfRange {
                control: ControlId::DigitalGain,
                value: 0x50
            }))
        ));
        assert_eq!(mocked.write_count(), 0);
        assert_eq!(sensor.controls().analog_gain(), MIN_ANALOG_GAIN);

        mocked.set_writes_fail(true);
        assert!(sensor.set_exposure_and_gains(300, 0x200, 0x180).is_err());
        assert_eq!(sensor.controls().exposure(), 2486);
        assert_eq!(sensor.controls().digital_gain(), MIN_DIGITAL_GAIN);
    }
}
