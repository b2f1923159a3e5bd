// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Frame timing constants, and the control ranges derived from them.
//!
//! The sensor's exposure is measured in lines, and can be at most the frame length (visible height
//! plus vertical blanking) less a small margin. Whenever the mode or the vertical blanking changes
//! the exposure range has to be recomputed.

/// Lines of a frame that can not be used for integration.
pub const INTEGRATION_TIME_MARGIN: u32 = 6;

pub const MIN_VBLANK: u32 = 4;

/// The frame length register is 16 bits wide, so visible lines plus blanking can't exceed this.
pub const MAX_VBLANK: u32 = 0xFFFF;

/// Pixels per line, including horizontal blanking.
pub const PIXELS_PER_LINE: u32 = 3440;

/// Lines per frame at the nominal frame rate, including vertical blanking.
pub const LINES_PER_FRAME: u32 = 2492;

pub const FRAMES_PER_SECOND: u32 = 30;

/// Pixel clock in pixels per second.
pub const PIXEL_RATE: u64 = PIXELS_PER_LINE as u64 * LINES_PER_FRAME as u64 * FRAMES_PER_SECOND as u64;

/// CSI-2 link frequency in Hz: 10 bits per pixel over four double data rate lanes.
pub const LINK_FREQUENCY: u64 = PIXEL_RATE * 10 / 8;

pub const MIN_ANALOG_GAIN: u16 = 0x0080;
pub const MAX_ANALOG_GAIN: u16 = 0x07FF;

/// Unity digital gain.
pub const MIN_DIGITAL_GAIN: u16 = 0x0100;
pub const MAX_DIGITAL_GAIN: u16 = 0x0FFF;

/// The bounds of a control's value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlRange {
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub default: i64,
}

impl ControlRange {
    pub const fn new(min: i64, max: i64, default: i64) -> Self {
        Self {
            min,
            max,
            step: 1,
            default,
        }
    }

    /// A range containing exactly one value.
    pub const fn fixed(value: i64) -> Self {
        Self::new(value, value, value)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
            && (self.step <= 1 || (value - self.min) % self.step == 0)
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// The longest exposure (in lines) possible for the given frame geometry.
pub fn derive_exposure_max(mode_height: u32, vblank: u32) -> u32 {
    (mode_height + vblank).saturating_sub(INTEGRATION_TIME_MARGIN)
}

/// The valid vertical blanking for a mode of the given height.
///
/// The default gives the nominal frame rate.
pub fn vblank_range(mode_height: u32) -> ControlRange {
    let max = MAX_VBLANK.saturating_sub(mode_height).max(MIN_VBLANK);
    let default = LINES_PER_FRAME
        .saturating_sub(mode_height)
        .clamp(MIN_VBLANK, max);
    ControlRange::new(i64::from(MIN_VBLANK), i64::from(max), i64::from(default))
}

/// The valid exposure for the given frame geometry. The default is the longest exposure.
pub fn exposure_range(mode_height: u32, vblank: u32) -> ControlRange {
    let max = i64::from(derive_exposure_max(mode_height, vblank));
    ControlRange::new(0, max, max)
}

/// Horizontal blanking is fixed by the line length.
pub fn hblank_range(mode_width: u32) -> ControlRange {
    ControlRange::fixed(i64::from(PIXELS_PER_LINE.saturating_sub(mode_width)))
}

pub fn analog_gain_range() -> ControlRange {
    ControlRange::new(
        i64::from(MIN_ANALOG_GAIN),
        i64::from(MAX_ANALOG_GAIN),
        i64::from(MIN_ANALOG_GAIN),
    )
}

pub fn digital_gain_range() -> ControlRange {
    ControlRange::new(
        i64::from(MIN_DIGITAL_GAIN),
        i64::from(MAX_DIGITAL_GAIN),
        i64::from(MIN_DIGITAL_GAIN),
    )
}

#[cfg(test)]
mod test {
    use crate::tables::MODES;

    use super::*;

    #[test]
    fn exposure_max() {
        assert_eq!(derive_exposure_max(496, 1996), 496 + 1996 - 6);
        assert_eq!(derive_exposure_max(0, 2), 0);
    }

    #[test]
    fn vblank_defaults_give_nominal_frame_length() {
        for mode in MODES.iter() {
            let range = vblank_range(mode.height());
            assert_eq!(range.min, 4);
            assert_eq!(range.max, i64::from(0xFFFF - mode.height()));
            assert_eq!(
                range.default + i64::from(mode.height()),
                i64::from(LINES_PER_FRAME)
            );
            assert!(range.contains(range.default));
        }
    }

    #[test]
    fn exposure_range_tracks_vblank() {
        let range = exposure_range(736, 4);
        assert_eq!(range, ControlRange::new(0, 734, 734));
        let range = exposure_range(736, 0xFFFF - 736);
        assert_eq!(range.max, 0xFFFF - 6);
    }

    #[test]
    fn hblank_is_fixed() {
        let range = hblank_range(3280);
        assert_eq!(range, ControlRange::fixed(160));
        assert!(range.contains(160));
        assert!(!range.contains(161));
    }

    #[test]
    fn timing_constants() {
        assert_eq!(PIXEL_RATE, 257_174_400);
        assert_eq!(LINK_FREQUENCY, 321_468_000);
    }

    #[test]
    fn range_helpers() {
        let range = analog_gain_range();
        assert_eq!(range.clamp(0), 0x80);
        assert_eq!(range.clamp(0x1000), 0x7FF);
        assert!(range.contains(0x100));
        assert!(!range.contains(-1));
        assert_eq!(digital_gain_range().default, 0x100);
    }
}
