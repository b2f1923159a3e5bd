// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Register sequences programmed into the sensor.
//!
//! All of these are plain 8-bit writes, so runs of neighbouring addresses coalesce into bursts
//! when written with [`write_sequence`][crate::codec::write_sequence].

use crate::mode::Mode;
use crate::register::RegisterOp;

/// Sensor-global setup written at the start of every stream.
pub static INIT_SEQUENCE: [RegisterOp; 81] = [
    RegisterOp::reg8(0x4136, 0x13),
    RegisterOp::reg8(0x4137, 0x33),
    RegisterOp::reg8(0x3094, 0x01),
    RegisterOp::reg8(0x0233, 0x01),
    RegisterOp::reg8(0x4B06, 0x01),
    RegisterOp::reg8(0x4B07, 0x01),
    RegisterOp::reg8(0x3028, 0x01),
    RegisterOp::reg8(0x3032, 0x14),
    RegisterOp::reg8(0x305C, 0x0C),
    RegisterOp::reg8(0x306D, 0x0A),
    RegisterOp::reg8(0x3071, 0xFA),
    RegisterOp::reg8(0x307E, 0x0A),
    RegisterOp::reg8(0x307F, 0xFC),
    RegisterOp::reg8(0x3091, 0x04),
    RegisterOp::reg8(0x3092, 0x60),
    RegisterOp::reg8(0x3096, 0xC0),
    RegisterOp::reg8(0x3100, 0x07),
    RegisterOp::reg8(0x3101, 0x4C),
    RegisterOp::reg8(0x3118, 0xCC),
    RegisterOp::reg8(0x3139, 0x06),
    RegisterOp::reg8(0x313A, 0x06),
    RegisterOp::reg8(0x313B, 0x04),
    RegisterOp::reg8(0x3143, 0x02),
    RegisterOp::reg8(0x314F, 0x0E),
    RegisterOp::reg8(0x3169, 0x99),
    RegisterOp::reg8(0x316A, 0x99),
    RegisterOp::reg8(0x3171, 0x05),
    RegisterOp::reg8(0x31A1, 0xA7),
    RegisterOp::reg8(0x31A2, 0x9C),
    RegisterOp::reg8(0x31A3, 0x8F),
    RegisterOp::reg8(0x31A4, 0x75),
    RegisterOp::reg8(0x31A5, 0xEE),
    RegisterOp::reg8(0x31A6, 0xEA),
    RegisterOp::reg8(0x31A7, 0xE4),
    RegisterOp::reg8(0x31A8, 0xE4),
    RegisterOp::reg8(0x31DF, 0x05),
    RegisterOp::reg8(0x31EC, 0x1B),
    RegisterOp::reg8(0x31ED, 0x1B),
    RegisterOp::reg8(0x31EE, 0x1B),
    RegisterOp::reg8(0x31F0, 0x1B),
    RegisterOp::reg8(0x31F1, 0x1B),
    RegisterOp::reg8(0x31F2, 0x1B),
    RegisterOp::reg8(0x3204, 0x3F),
    RegisterOp::reg8(0x3205, 0x03),
    RegisterOp::reg8(0x3210, 0x01),
    RegisterOp::reg8(0x3216, 0x68),
    RegisterOp::reg8(0x3217, 0x58),
    RegisterOp::reg8(0x3218, 0x58),
    RegisterOp::reg8(0x321A, 0x68),
    RegisterOp::reg8(0x321B, 0x60),
    RegisterOp::reg8(0x3238, 0x03),
    RegisterOp::reg8(0x3239, 0x03),
    RegisterOp::reg8(0x323A, 0x05),
    RegisterOp::reg8(0x323B, 0x06),
    RegisterOp::reg8(0x3243, 0x03),
    RegisterOp::reg8(0x3244, 0x08),
    RegisterOp::reg8(0x3245, 0x01),
    RegisterOp::reg8(0x3307, 0x19),
    RegisterOp::reg8(0x3308, 0x19),
    RegisterOp::reg8(0x3320, 0x01),
    RegisterOp::reg8(0x3326, 0x15),
    RegisterOp::reg8(0x3327, 0x0D),
    RegisterOp::reg8(0x3328, 0x01),
    RegisterOp::reg8(0x3380, 0x01),
    RegisterOp::reg8(0x339E, 0x07),
    RegisterOp::reg8(0x3424, 0x00),
    RegisterOp::reg8(0x343C, 0x01),
    RegisterOp::reg8(0x3398, 0x04),
    RegisterOp::reg8(0x343A, 0x10),
    RegisterOp::reg8(0x339A, 0x22),
    RegisterOp::reg8(0x33B4, 0x00),
    RegisterOp::reg8(0x3393, 0x01),
    RegisterOp::reg8(0x33B3, 0x6E),
    RegisterOp::reg8(0x3433, 0x06),
    RegisterOp::reg8(0x3433, 0x00),
    RegisterOp::reg8(0x33B3, 0x00),
    RegisterOp::reg8(0x3393, 0x03),
    RegisterOp::reg8(0x33B4, 0x03),
    RegisterOp::reg8(0x343A, 0x00),
    RegisterOp::reg8(0x339A, 0x00),
    RegisterOp::reg8(0x3398, 0x00),
];

/// 736×496 at 30 frames per second.
pub static MODE_736X496: [RegisterOp; 49] = [
    RegisterOp::reg8(0x0112, 0x0A),
    RegisterOp::reg8(0x0113, 0x0A),
    RegisterOp::reg8(0x0114, 0x03),
    RegisterOp::reg8(0x4136, 0x13),
    RegisterOp::reg8(0x4137, 0x33),
    RegisterOp::reg8(0x0820, 0x0A),
    RegisterOp::reg8(0x0821, 0x0D),
    RegisterOp::reg8(0x0822, 0x00),
    RegisterOp::reg8(0x0823, 0x00),
    RegisterOp::reg8(0x0301, 0x0A),
    RegisterOp::reg8(0x0303, 0x01),
    RegisterOp::reg8(0x0305, 0x04),
    RegisterOp::reg8(0x0306, 0x02),
    RegisterOp::reg8(0x0307, 0x18),
    RegisterOp::reg8(0x030B, 0x01),
    RegisterOp::reg8(0x034C, 0x02),
    RegisterOp::reg8(0x034D, 0xE0),
    RegisterOp::reg8(0x034E, 0x01),
    RegisterOp::reg8(0x034F, 0xEE),
    RegisterOp::reg8(0x0340, 0x09),
    RegisterOp::reg8(0x0341, 0xBC),
    RegisterOp::reg8(0x0342, 0x0D),
    RegisterOp::reg8(0x0343, 0x70),
    RegisterOp::reg8(0x0344, 0x00),
    RegisterOp::reg8(0x0345, 0x00),
    RegisterOp::reg8(0x0346, 0x00),
    RegisterOp::reg8(0x0347, 0x00),
    RegisterOp::reg8(0x0348, 0x0C),
    RegisterOp::reg8(0x0349, 0xCF),
    RegisterOp::reg8(0x034A, 0x09),
    RegisterOp::reg8(0x034B, 0x9F),
    RegisterOp::reg8(0x0408, 0x01),
    RegisterOp::reg8(0x0409, 0x74),
    RegisterOp::reg8(0x040A, 0x00),
    RegisterOp::reg8(0x040B, 0xFA),
    RegisterOp::reg8(0x040C, 0x02),
    RegisterOp::reg8(0x040D, 0xE0),
    RegisterOp::reg8(0x040E, 0x01),
    RegisterOp::reg8(0x040F, 0xF0),
    RegisterOp::reg8(0x0900, 0x01),
    RegisterOp::reg8(0x0901, 0x22),
    RegisterOp::reg8(0x0902, 0x00),
    RegisterOp::reg8(0x4220, 0x00),
    RegisterOp::reg8(0x4222, 0x01),
    RegisterOp::reg8(0x3380, 0x01),
    RegisterOp::reg8(0x3090, 0x88),
    RegisterOp::reg8(0x3394, 0x20),
    RegisterOp::reg8(0x3090, 0x08),
    RegisterOp::reg8(0x3394, 0x10),
];

/// 896×736 at 30 frames per second.
pub static MODE_896X736: [RegisterOp; 49] = [
    RegisterOp::reg8(0x0112, 0x0A),
    RegisterOp::reg8(0x0113, 0x0A),
    RegisterOp::reg8(0x0114, 0x03),
    RegisterOp::reg8(0x4136, 0x13),
    RegisterOp::reg8(0x4137, 0x33),
    RegisterOp::reg8(0x0820, 0x0A),
    RegisterOp::reg8(0x0821, 0x0D),
    RegisterOp::reg8(0x0822, 0x00),
    RegisterOp::reg8(0x0823, 0x00),
    RegisterOp::reg8(0x0301, 0x0A),
    RegisterOp::reg8(0x0303, 0x01),
    RegisterOp::reg8(0x0305, 0x04),
    RegisterOp::reg8(0x0306, 0x02),
    RegisterOp::reg8(0x0307, 0x18),
    RegisterOp::reg8(0x030B, 0x01),
    RegisterOp::reg8(0x034C, 0x03),
    RegisterOp::reg8(0x034D, 0x80),
    RegisterOp::reg8(0x034E, 0x02),
    RegisterOp::reg8(0x034F, 0xDE),
    RegisterOp::reg8(0x0340, 0x09),
    RegisterOp::reg8(0x0341, 0xBC),
    RegisterOp::reg8(0x0342, 0x0D),
    RegisterOp::reg8(0x0343, 0x70),
    RegisterOp::reg8(0x0344, 0x00),
    RegisterOp::reg8(0x0345, 0x00),
    RegisterOp::reg8(0x0346, 0x00),
    RegisterOp::reg8(0x0347, 0x00),
    RegisterOp::reg8(0x0348, 0x0C),
    RegisterOp::reg8(0x0349, 0xCF),
    RegisterOp::reg8(0x034A, 0x09),
    RegisterOp::reg8(0x034B, 0x9F),
    RegisterOp::reg8(0x0408, 0x01),
    RegisterOp::reg8(0x0409, 0x74),
    RegisterOp::reg8(0x040A, 0x00),
    RegisterOp::reg8(0x040B, 0xFA),
    RegisterOp::reg8(0x040C, 0x03),
    RegisterOp::reg8(0x040D, 0x80),
    RegisterOp::reg8(0x040E, 0x02),
    RegisterOp::reg8(0x040F, 0xE0),
    RegisterOp::reg8(0x0900, 0x01),
    RegisterOp::reg8(0x0901, 0x22),
    RegisterOp::reg8(0x0902, 0x00),
    RegisterOp::reg8(0x4220, 0x00),
    RegisterOp::reg8(0x4222, 0x01),
    RegisterOp::reg8(0x3380, 0x01),
    RegisterOp::reg8(0x3090, 0x88),
    RegisterOp::reg8(0x3394, 0x20),
    RegisterOp::reg8(0x3090, 0x08),
    RegisterOp::reg8(0x3394, 0x10),
];

/// 1936×1096 at 30 frames per second.
pub static MODE_1936X1096: [RegisterOp; 49] = [
    RegisterOp::reg8(0x0112, 0x0A),
    RegisterOp::reg8(0x0113, 0x0A),
    RegisterOp::reg8(0x0114, 0x03),
    RegisterOp::reg8(0x4136, 0x13),
    RegisterOp::reg8(0x4137, 0x33),
    RegisterOp::reg8(0x0820, 0x0A),
    RegisterOp::reg8(0x0821, 0x0D),
    RegisterOp::reg8(0x0822, 0x00),
    RegisterOp::reg8(0x0823, 0x00),
    RegisterOp::reg8(0x0301, 0x0A),
    RegisterOp::reg8(0x0303, 0x01),
    RegisterOp::reg8(0x0305, 0x04),
    RegisterOp::reg8(0x0306, 0x02),
    RegisterOp::reg8(0x0307, 0x18),
    RegisterOp::reg8(0x030B, 0x01),
    RegisterOp::reg8(0x034C, 0x07),
    RegisterOp::reg8(0x034D, 0x90),
    RegisterOp::reg8(0x034E, 0x04),
    RegisterOp::reg8(0x034F, 0x46),
    RegisterOp::reg8(0x0340, 0x09),
    RegisterOp::reg8(0x0341, 0xBC),
    RegisterOp::reg8(0x0342, 0x0D),
    RegisterOp::reg8(0x0343, 0x70),
    RegisterOp::reg8(0x0344, 0x00),
    RegisterOp::reg8(0x0345, 0x00),
    RegisterOp::reg8(0x0346, 0x00),
    RegisterOp::reg8(0x0347, 0x00),
    RegisterOp::reg8(0x0348, 0x0C),
    RegisterOp::reg8(0x0349, 0xCF),
    RegisterOp::reg8(0x034A, 0x09),
    RegisterOp::reg8(0x034B, 0x9F),
    RegisterOp::reg8(0x0408, 0x02),
    RegisterOp::reg8(0x0409, 0xA0),
    RegisterOp::reg8(0x040A, 0x02),
    RegisterOp::reg8(0x040B, 0xAE),
    RegisterOp::reg8(0x040C, 0x07),
    RegisterOp::reg8(0x040D, 0x90),
    RegisterOp::reg8(0x040E, 0x04),
    RegisterOp::reg8(0x040F, 0x4B),
    RegisterOp::reg8(0x0900, 0x01),
    RegisterOp::reg8(0x0901, 0x11),
    RegisterOp::reg8(0x0902, 0x00),
    RegisterOp::reg8(0x4220, 0x00),
    RegisterOp::reg8(0x4222, 0x01),
    RegisterOp::reg8(0x3380, 0x01),
    RegisterOp::reg8(0x3090, 0x88),
    RegisterOp::reg8(0x3394, 0x20),
    RegisterOp::reg8(0x3090, 0x08),
    RegisterOp::reg8(0x3394, 0x10),
];

/// The full 3280×2464 array at 30 frames per second.
pub static MODE_3280X2464: [RegisterOp; 49] = [
    RegisterOp::reg8(0x0112, 0x0A),
    RegisterOp::reg8(0x0113, 0x0A),
    RegisterOp::reg8(0x0114, 0x03),
    RegisterOp::reg8(0x4136, 0x13),
    RegisterOp::reg8(0x4137, 0x33),
    RegisterOp::reg8(0x0820, 0x0A),
    RegisterOp::reg8(0x0821, 0x0D),
    RegisterOp::reg8(0x0822, 0x00),
    RegisterOp::reg8(0x0823, 0x00),
    RegisterOp::reg8(0x0301, 0x0A),
    RegisterOp::reg8(0x0303, 0x01),
    RegisterOp::reg8(0x0305, 0x04),
    RegisterOp::reg8(0x0306, 0x02),
    RegisterOp::reg8(0x0307, 0x18),
    RegisterOp::reg8(0x030B, 0x01),
    RegisterOp::reg8(0x034C, 0x0C),
    RegisterOp::reg8(0x034D, 0xD0),
    RegisterOp::reg8(0x034E, 0x09),
    RegisterOp::reg8(0x034F, 0x9E),
    RegisterOp::reg8(0x0340, 0x09),
    RegisterOp::reg8(0x0341, 0xBC),
    RegisterOp::reg8(0x0342, 0x0D),
    RegisterOp::reg8(0x0343, 0x70),
    RegisterOp::reg8(0x0344, 0x00),
    RegisterOp::reg8(0x0345, 0x00),
    RegisterOp::reg8(0x0346, 0x00),
    RegisterOp::reg8(0x0347, 0x00),
    RegisterOp::reg8(0x0348, 0x0C),
    RegisterOp::reg8(0x0349, 0xCF),
    RegisterOp::reg8(0x034A, 0x09),
    RegisterOp::reg8(0x034B, 0x9F),
    RegisterOp::reg8(0x0408, 0x00),
    RegisterOp::reg8(0x0409, 0x00),
    RegisterOp::reg8(0x040A, 0x00),
    RegisterOp::reg8(0x040B, 0x02),
    RegisterOp::reg8(0x040C, 0x0C),
    RegisterOp::reg8(0x040D, 0xD0),
    RegisterOp::reg8(0x040E, 0x09),
    RegisterOp::reg8(0x040F, 0xA0),
    RegisterOp::reg8(0x0900, 0x01),
    RegisterOp::reg8(0x0901, 0x11),
    RegisterOp::reg8(0x0902, 0x00),
    RegisterOp::reg8(0x4220, 0x00),
    RegisterOp::reg8(0x4222, 0x01),
    RegisterOp::reg8(0x3380, 0x01),
    RegisterOp::reg8(0x3090, 0x88),
    RegisterOp::reg8(0x3394, 0x20),
    RegisterOp::reg8(0x3090, 0x08),
    RegisterOp::reg8(0x3394, 0x10),
];

/// Every mode the sensor supports, smallest first.
///
/// The first entry is the mode a freshly attached sensor starts in.
pub static MODES: [Mode; 4] = [
    Mode::new(736, 496, &MODE_736X496, 2),
    Mode::new(896, 736, &MODE_896X736, 2),
    Mode::new(1936, 1096, &MODE_1936X1096, 2),
    Mode::new(3280, 2464, &MODE_3280X2464, 0),
];
