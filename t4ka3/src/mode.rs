// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use core::cmp::Ordering;
use core::fmt;

use crate::error::LibraryError;
use crate::register::RegisterOp;
use crate::tables::MODES;

/// A supported resolution, along with the register sequence that configures the sensor for it.
///
/// Modes compare and order by their resolution (width first, then height) only.
#[derive(Clone, Copy)]
pub struct Mode {
    width: u32,
    height: u32,
    sequence: &'static [RegisterOp],
    skip_frames: u32,
}

impl Mode {
    pub const fn new(
        width: u32,
        height: u32,
        sequence: &'static [RegisterOp],
        skip_frames: u32,
    ) -> Self {
        Self {
            width,
            height,
            sequence,
            skip_frames,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The registers to write (under group hold) to switch the sensor into this mode.
    pub fn register_sequence(&self) -> &'static [RegisterOp] {
        self.sequence
    }

    /// How many frames to throw away after switching into this mode before the output is valid.
    pub fn skip_frames(&self) -> u32 {
        self.skip_frames
    }

    fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mode")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("registers", &self.sequence.len())
            .field("skip_frames", &self.skip_frames)
            .finish()
    }
}

impl PartialEq for Mode {
    fn eq(&self, other: &Self) -> bool {
        self.resolution() == other.resolution()
    }
}

impl Eq for Mode {}

impl PartialOrd for Mode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.resolution().cmp(&other.resolution())
    }
}

/// Fixed point scale used when comparing aspect ratios (13 fractional bits).
const RATIO_UNITY: u64 = 1 << 13;

/// The largest aspect ratio mismatch (in [`RATIO_UNITY`] units) a candidate may have.
const RATIO_TOLERANCE: u64 = 800;

/// The set of modes a sensor supports.
#[derive(Clone, Copy, Debug)]
pub struct ModeTable {
    modes: &'static [Mode],
}

impl Default for ModeTable {
    /// The T4KA3's own modes.
    fn default() -> Self {
        Self { modes: &MODES }
    }
}

impl ModeTable {
    /// Create a table from a custom list of modes. The list may not be empty.
    pub fn new(modes: &'static [Mode]) -> Result<Self, LibraryError> {
        if modes.is_empty() {
            Err(LibraryError::ConfigInconsistent("a mode table needs at least one mode"))
        } else {
            Ok(Self { modes })
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'static, Mode> {
        self.modes.iter()
    }

    /// The mode a freshly attached sensor is in: the first one in the table.
    pub fn default_mode(&self) -> &'static Mode {
        &self.modes[0]
    }

    /// The mode covering the most pixels.
    pub fn largest(&self) -> &'static Mode {
        self.modes
            .iter()
            .max_by_key(|mode| mode.pixel_count())
            .unwrap_or(&self.modes[0])
    }

    /// Find the mode best suited to the requested resolution.
    ///
    /// Only modes at least as large as the request in both dimensions, and with an aspect ratio
    /// within tolerance of the requested one, are candidates. The candidate closest in size wins,
    /// with earlier table entries winning ties. If there are no candidates the largest mode that
    /// still covers the request is returned, and failing that the largest mode overall.
    pub fn nearest_mode(&self, width: u32, height: u32) -> &'static Mode {
        let width = u64::from(width.max(1));
        let height = u64::from(height.max(1));
        let mut best: Option<(&'static Mode, u64)> = None;
        for mode in self.modes.iter() {
            let width_ratio = (u64::from(mode.width) * RATIO_UNITY) / width;
            let height_ratio = (u64::from(mode.height) * RATIO_UNITY) / height;
            if width_ratio < RATIO_UNITY || height_ratio < RATIO_UNITY {
                continue;
            }
            let aspect = (width_ratio * RATIO_UNITY) / height_ratio;
            if aspect.abs_diff(RATIO_UNITY) > RATIO_TOLERANCE {
                continue;
            }
            let distance = width_ratio + height_ratio;
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((mode, distance)),
            }
        }
        best.map(|(mode, _)| mode)
            .or_else(|| {
                self.modes
                    .iter()
                    .filter(|mode| {
                        u64::from(mode.width) >= width && u64::from(mode.height) >= height
                    })
                    .max_by_key(|mode| mode.pixel_count())
            })
            .unwrap_or_else(|| self.largest())
    }

    /// The resolutions of every mode, in table order.
    pub fn resolutions(&self) -> impl Iterator<Item = (u32, u32)> + 'static {
        self.modes.iter().map(Mode::resolution)
    }
}
