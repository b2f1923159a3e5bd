// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use arrayvec::ArrayVec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::exposure::*;
use crate::mode::Mode;
use crate::register::*;

/// The controls a T4KA3 exposes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum ControlId {
    HorizontalFlip = 0,
    VerticalFlip = 1,
    /// Coarse integration time, in lines.
    Exposure = 2,
    AnalogGain = 3,
    /// Applied equally to all four color channels.
    DigitalGain = 4,
    /// Blanking lines after each frame. Changes the frame rate and the longest exposure.
    VerticalBlank = 5,
    /// Read-only, fixed by the line length of the current mode.
    HorizontalBlank = 6,
    /// See [`TestPattern`].
    TestPattern = 7,
    /// Read-only, in Hz.
    LinkFrequency = 8,
    /// Read-only, in pixels per second.
    PixelRate = 9,
}

impl ControlId {
    pub const ALL: [ControlId; 10] = [
        ControlId::HorizontalFlip,
        ControlId::VerticalFlip,
        ControlId::Exposure,
        ControlId::AnalogGain,
        ControlId::DigitalGain,
        ControlId::VerticalBlank,
        ControlId::HorizontalBlank,
        ControlId::TestPattern,
        ControlId::LinkFrequency,
        ControlId::PixelRate,
    ];

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            ControlId::HorizontalBlank | ControlId::LinkFrequency | ControlId::PixelRate
        )
    }

    /// Controls that change the layout of the image data (and so the [`BayerOrder`]).
    pub fn modifies_layout(self) -> bool {
        matches!(self, ControlId::HorizontalFlip | ControlId::VerticalFlip)
    }
}

/// Image mirroring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub fn new(horizontal: bool, vertical: bool) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

impl From<Flip> for OrientationRegister {
    fn from(flip: Flip) -> Self {
        OrientationRegister::new(flip.horizontal, flip.vertical)
    }
}

/// The color filter array order of the (10-bit raw) output.
///
/// The discriminants are the media bus format codes for each order. The sensor's native order is
/// GRBG; flipping shifts which pixel is read out first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum BayerOrder {
    Sgrbg10 = 0x300A,
    Sbggr10 = 0x3007,
    Srggb10 = 0x300F,
    Sgbrg10 = 0x300E,
}

impl BayerOrder {
    /// Orders indexed by `vertical + 2 * horizontal`.
    const BY_FLIP: [BayerOrder; 4] = [
        BayerOrder::Sgrbg10,
        BayerOrder::Sbggr10,
        BayerOrder::Srggb10,
        BayerOrder::Sgbrg10,
    ];

    pub fn from_flip(flip: Flip) -> Self {
        let index = usize::from(flip.vertical) + 2 * usize::from(flip.horizontal);
        Self::BY_FLIP[index]
    }

    pub fn media_bus_code(self) -> u32 {
        self.into()
    }
}

/// The built in test patterns.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TestPattern {
    /// Normal image output.
    Disabled = 0,
    SolidWhite = 1,
    ColorBars = 2,
    Gradient = 3,
    RandomData = 4,
}

impl Default for TestPattern {
    fn default() -> Self {
        TestPattern::Disabled
    }
}

impl TestPattern {
    pub fn name(self) -> &'static str {
        match self {
            TestPattern::Disabled => "Disabled",
            TestPattern::SolidWhite => "Solid White",
            TestPattern::ColorBars => "Color Bars",
            TestPattern::Gradient => "Gradient",
            TestPattern::RandomData => "Random Data",
        }
    }
}

/// The image format the sensor produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Format {
    pub width: u32,
    pub height: u32,
    pub bayer_order: BayerOrder,
}

impl Format {
    pub(crate) fn new(mode: &Mode, flip: Flip) -> Self {
        Self {
            width: mode.width(),
            height: mode.height(),
            bayer_order: BayerOrder::from_flip(flip),
        }
    }
}

/// The most register writes a single control turns into (digital gain, one per channel).
pub(crate) const MAX_CONTROL_WRITES: usize = 4;

/// The last value set for each writable control.
///
/// These are kept whether or not the sensor is streaming, and are replayed into the sensor every
/// time a stream starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Controls {
    pub(crate) flip: Flip,
    pub(crate) exposure: u16,
    pub(crate) analog_gain: u16,
    pub(crate) digital_gain: u16,
    pub(crate) vblank: u16,
    pub(crate) test_pattern: TestPattern,
}

impl Controls {
    pub(crate) fn new(flip: Flip, test_pattern: TestPattern, mode: &Mode) -> Self {
        let mut controls = Self {
            flip,
            exposure: 0,
            analog_gain: MIN_ANALOG_GAIN,
            digital_gain: MIN_DIGITAL_GAIN,
            vblank: 0,
            test_pattern,
        };
        controls.reset_for_mode(mode);
        controls
    }

    /// Put the mode-dependent controls back to their defaults.
    ///
    /// Vertical blanking goes back to the nominal frame rate, exposure to the longest allowed, and
    /// both gains to their minimums. Flip and the test pattern are left alone.
    pub(crate) fn reset_for_mode(&mut self, mode: &Mode) {
        self.vblank = saturate(vblank_range(mode.height()).default);
        self.exposure = saturate(self.exposure_range(mode).default);
        self.analog_gain = MIN_ANALOG_GAIN;
        self.digital_gain = MIN_DIGITAL_GAIN;
    }

    pub(crate) fn exposure_range(&self, mode: &Mode) -> ControlRange {
        exposure_range(mode.height(), u32::from(self.vblank))
    }

    pub fn flip(&self) -> Flip {
        self.flip
    }

    pub fn exposure(&self) -> u16 {
        self.exposure
    }

    pub fn analog_gain(&self) -> u16 {
        self.analog_gain
    }

    pub fn digital_gain(&self) -> u16 {
        self.digital_gain
    }

    pub fn vblank(&self) -> u16 {
        self.vblank
    }

    pub fn test_pattern(&self) -> TestPattern {
        self.test_pattern
    }

    /// The register writes that apply `control`'s current value.
    ///
    /// Flips live in a register shared with reserved bits, so they need a read-modify-write and
    /// aren't included here. Read-only controls have no registers.
    pub(crate) fn register_writes(
        &self,
        control: ControlId,
        mode: &Mode,
    ) -> ArrayVec<RegisterOp, MAX_CONTROL_WRITES> {
        let mut writes = ArrayVec::new();
        match control {
            ControlId::Exposure => {
                writes.push(RegisterOp::word_at(COARSE_INTEGRATION_TIME, self.exposure));
            }
            ControlId::AnalogGain => {
                writes.push(RegisterOp::word_at(GLOBAL_GAIN, self.analog_gain));
            }
            ControlId::DigitalGain => {
                // Laid out consecutively, so these go out as one burst.
                writes.extend(
                    [
                        DIGITAL_GAIN_GREEN_RED,
                        DIGITAL_GAIN_RED,
                        DIGITAL_GAIN_BLUE,
                        DIGITAL_GAIN_GREEN_BLUE,
                    ]
                    .into_iter()
                    .map(|address| RegisterOp::word_at(address, self.digital_gain)),
                );
            }
            ControlId::VerticalBlank => {
                let frame_length = mode.height() + u32::from(self.vblank);
                writes.push(RegisterOp::word_at(
                    FRAME_LENGTH_LINES,
                    saturate(i64::from(frame_length)),
                ));
            }
            ControlId::TestPattern => {
                writes.push(RegisterOp::byte_at(
                    TEST_PATTERN_MODE,
                    self.test_pattern.into(),
                ));
            }
            ControlId::HorizontalFlip
            | ControlId::VerticalFlip
            | ControlId::HorizontalBlank
            | ControlId::LinkFrequency
            | ControlId::PixelRate => {}
        }
        writes
    }

    /// Every register write needed to bring the sensor in line with these values, flips excepted.
    ///
    /// Frame length goes first so that the exposure written after it is always within range.
    pub(crate) fn replay_sequence(&self, mode: &Mode) -> ArrayVec<RegisterOp, 8> {
        [
            ControlId::VerticalBlank,
            ControlId::Exposure,
            ControlId::AnalogGain,
            ControlId::DigitalGain,
            ControlId::TestPattern,
        ]
        .into_iter()
        .flat_map(|control| self.register_writes(control, mode))
        .collect()
    }
}

/// Narrow a value that has already been range checked into a 16-bit register value.
pub(crate) fn saturate(value: i64) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}
