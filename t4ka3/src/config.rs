// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Board-level settings for a sensor, usually supplied by firmware properties.
//!
//! The textual form is a list of `key=value` pairs separated by `;`, for example
//! `hflip; vflip=0; link-frequency=0x1329C5A0; i2c-retries=5`. A key without a value is a boolean
//! `true`.
use core::str::FromStr;

use log::warn;

use crate::controls::{Flip, TestPattern};
use crate::error::LibraryError;
use crate::exposure::LINK_FREQUENCY;
use crate::transport::DEFAULT_RETRIES;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SensorConfig {
    /// Whether the module is mounted mirrored horizontally.
    pub hflip: bool,

    /// Whether the module is mounted upside down.
    pub vflip: bool,

    /// The CSI-2 link frequency in Hz.
    pub link_frequency: u64,

    /// How many times a failed I²C transfer is retried.
    pub i2c_retries: u8,

    /// The test pattern to start out with.
    pub test_pattern: TestPattern,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            hflip: false,
            vflip: false,
            link_frequency: LINK_FREQUENCY,
            i2c_retries: DEFAULT_RETRIES,
            test_pattern: TestPattern::Disabled,
        }
    }
}

impl SensorConfig {
    /// Parse a property string, starting from the defaults.
    ///
    /// Unknown keys are skipped with a warning. Any malformed value fails the whole parse.
    pub fn parse(properties: &str) -> Result<Self, LibraryError> {
        let mut config = Self::default();
        for segment in properties.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment, None),
            };
            match key {
                "hflip" => config.hflip = parse_bool(value)?,
                "vflip" => config.vflip = parse_bool(value)?,
                "link-frequency" => {
                    config.link_frequency = parse_integer(value)?;
                    if config.link_frequency == 0 {
                        return Err(LibraryError::InvalidData("link-frequency must be non-zero"));
                    }
                }
                "i2c-retries" => {
                    config.i2c_retries = u8::try_from(parse_integer(value)?)
                        .map_err(|_| LibraryError::InvalidData("i2c-retries is too large"))?;
                }
                "test-pattern" => {
                    let raw = u8::try_from(parse_integer(value)?)
                        .map_err(|_| LibraryError::InvalidData("unknown test-pattern"))?;
                    config.test_pattern = TestPattern::try_from(raw)
                        .map_err(|_| LibraryError::InvalidData("unknown test-pattern"))?;
                }
                _ => warn!("Ignoring unknown sensor property '{}'", key),
            }
        }
        Ok(config)
    }

    pub fn flip(&self) -> Flip {
        Flip::new(self.hflip, self.vflip)
    }
}

impl FromStr for SensorConfig {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_bool(value: Option<&str>) -> Result<bool, LibraryError> {
    let value = match value {
        None => return Ok(true),
        Some(value) => value,
    };
    const TRUE: [&str; 4] = ["1", "true", "on", "yes"];
    const FALSE: [&str; 4] = ["0", "false", "off", "no"];
    if TRUE.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        Ok(true)
    } else if FALSE.iter().any(|f| value.eq_ignore_ascii_case(f)) {
        Ok(false)
    } else {
        Err(LibraryError::InvalidData("expected a boolean property value"))
    }
}

fn parse_integer(value: Option<&str>) -> Result<u64, LibraryError> {
    let value = value.ok_or(LibraryError::InvalidData("property needs a numeric value"))?;
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| LibraryError::InvalidData("expected an integer property value"))
}
