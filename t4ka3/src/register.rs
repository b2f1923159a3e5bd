// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The T4KA3 register map, and the register operations the mode tables are built from.
use core::fmt;

use arrayvec::ArrayVec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::LibraryError;
use crate::util::{is_bit_set, with_bit};

/// Marker newtype for register addresses accessible over I<sup>2</sup>C.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    /// Wrap the given address in an `Address`.
    ///
    /// This function is intended to be used in const contexts, in other cases the
    /// [`From`][core::convert::From] implementation is probably easier to use.
    pub const fn new(address: u16) -> Self {
        Self(address)
    }

    pub(crate) fn as_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// The address `count` bytes past this one, if it exists.
    pub(crate) fn offset(&self, count: usize) -> Option<Self> {
        u16::try_from(count)
            .ok()
            .and_then(|count| self.0.checked_add(count))
            .map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#06X})", self.0)
    }
}

impl From<u16> for Address {
    fn from(raw_address: u16) -> Self {
        Self::new(raw_address)
    }
}

impl From<Address> for u16 {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Product ID, most significant byte.
pub const PRODUCT_ID_HIGH: Address = Address::new(0x0000);
/// Product ID, least significant byte.
pub const PRODUCT_ID_LOW: Address = Address::new(0x0001);
/// Streaming enable. 1 streams, 0 idles.
pub const STREAM: Address = Address::new(0x0100);
/// Image orientation, see [`OrientationRegister`].
pub const IMAGE_ORIENTATION: Address = Address::new(0x0101);
/// Parameter (group) hold. While set, register writes are latched but not applied.
pub const PARAM_HOLD: Address = Address::new(0x0104);
/// Coarse integration time (exposure) in lines.
pub const COARSE_INTEGRATION_TIME: Address = Address::new(0x0202);
/// The first of the four per-channel digital gains (Gr, R, B, Gb), each 16 bits.
pub const DIGITAL_GAIN_GREEN_RED: Address = Address::new(0x020E);
pub const DIGITAL_GAIN_RED: Address = Address::new(0x0210);
pub const DIGITAL_GAIN_BLUE: Address = Address::new(0x0212);
pub const DIGITAL_GAIN_GREEN_BLUE: Address = Address::new(0x0214);
/// Analog (global) gain.
pub const GLOBAL_GAIN: Address = Address::new(0x0234);
/// Frame length in lines, the visible height plus vertical blanking.
pub const FRAME_LENGTH_LINES: Address = Address::new(0x0340);
pub const TEST_PATTERN_MODE: Address = Address::new(0x0601);

/// The size of a register.
///
/// The discriminant is the number of bytes the register occupies on the bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RegisterWidth {
    Eight = 1,
    Sixteen = 2,
}

impl RegisterWidth {
    /// The number of bytes a value of this width takes.
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// The largest value that fits in this width.
    pub const fn max_value(self) -> u32 {
        match self {
            RegisterWidth::Eight => u8::MAX as u32,
            RegisterWidth::Sixteen => u16::MAX as u32,
        }
    }
}

/// A single register write: an address, the width of the register, and the value to write.
///
/// The value always fits in the width; the const constructors guarantee it through their argument
/// types and [`RegisterOp::new`] checks it.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct RegisterOp {
    address: Address,
    width: RegisterWidth,
    value: u32,
}

impl RegisterOp {
    pub const fn reg8(address: u16, value: u8) -> Self {
        Self::byte_at(Address::new(address), value)
    }

    pub const fn reg16(address: u16, value: u16) -> Self {
        Self::word_at(Address::new(address), value)
    }

    /// An 8-bit write to one of the named registers.
    pub const fn byte_at(address: Address, value: u8) -> Self {
        Self {
            address,
            width: RegisterWidth::Eight,
            value: value as u32,
        }
    }

    /// A 16-bit write to one of the named registers.
    pub const fn word_at(address: Address, value: u16) -> Self {
        Self {
            address,
            width: RegisterWidth::Sixteen,
            value: value as u32,
        }
    }

    /// Create a `RegisterOp`, checking that `value` fits in `width`.
    pub fn new(address: Address, width: RegisterWidth, value: u32) -> Result<Self, LibraryError> {
        if value > width.max_value() {
            Err(LibraryError::InvalidData("register value does not fit in its width"))
        } else {
            Ok(Self {
                address,
                width,
                value,
            })
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn width(&self) -> RegisterWidth {
        self.width
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// The address just past the end of this register.
    pub(crate) fn end_address(&self) -> Option<Address> {
        self.address.offset(self.width.bytes())
    }

    /// The value as it is sent on the bus, most significant byte first.
    pub(crate) fn value_bytes(&self) -> ArrayVec<u8, 2> {
        let bytes = self.value.to_be_bytes();
        bytes[bytes.len() - self.width.bytes()..]
            .iter()
            .copied()
            .collect()
    }
}

impl fmt::Debug for RegisterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            RegisterWidth::Eight => write!(f, "{:?} <- {:#04X}", self.address, self.value),
            RegisterWidth::Sixteen => write!(f, "{:?} <- {:#06X}", self.address, self.value),
        }
    }
}

/// Trait for common 8-bit control register functionality.
pub trait Register: Into<u8> + From<u8> {
    /// A bit mask of which bits can be modified by the controller.
    ///
    /// When changing register values on the sensor, the current value should be read, then
    /// bitwise-ANDed with the complement of this mask, then bitwise-ORd with the new value. This
    /// preserves the values of any reserved bits in the registers.
    fn write_mask() -> u8;

    /// The address of this register in the sensor's register map.
    fn address() -> Address;
}

/// The image orientation register (0x0101).
///
/// Flipping changes the order the color filter array is read out in, see
/// [`BayerOrder`][crate::BayerOrder].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OrientationRegister {
    /// Mirror the image left to right.
    pub(crate) horizontal_flip: bool,

    /// Mirror the image top to bottom.
    pub(crate) vertical_flip: bool,
}

impl OrientationRegister {
    const HORIZONTAL_FLIP_BIT: usize = 0;
    const VERTICAL_FLIP_BIT: usize = 1;

    pub fn new(horizontal_flip: bool, vertical_flip: bool) -> Self {
        Self {
            horizontal_flip,
            vertical_flip,
        }
    }

    pub fn horizontal_flip(&self) -> bool {
        self.horizontal_flip
    }

    pub fn vertical_flip(&self) -> bool {
        self.vertical_flip
    }
}

impl Register for OrientationRegister {
    fn write_mask() -> u8 {
        // Only the two flip bits are ours, the rest are reserved.
        0x03
    }

    fn address() -> Address {
        IMAGE_ORIENTATION
    }
}

impl From<u8> for OrientationRegister {
    fn from(raw: u8) -> Self {
        Self {
            horizontal_flip: is_bit_set(raw, Self::HORIZONTAL_FLIP_BIT),
            vertical_flip: is_bit_set(raw, Self::VERTICAL_FLIP_BIT),
        }
    }
}

impl From<OrientationRegister> for u8 {
    fn from(orientation: OrientationRegister) -> Self {
        let register = with_bit(
            0u8,
            OrientationRegister::HORIZONTAL_FLIP_BIT,
            orientation.horizontal_flip,
        );
        with_bit(
            register,
            OrientationRegister::VERTICAL_FLIP_BIT,
            orientation.vertical_flip,
        )
    }
}

/// Combine a new register value with the reserved bits of the current one.
pub(crate) fn merge_masked<R: Register>(current: u8, new: R) -> u8 {
    let mask = R::write_mask();
    (current & !mask) | (new.into() & mask)
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::format;

    use super::*;

    #[test]
    fn register_op_checks_width() {
        let op = RegisterOp::new(Address::new(0x0202), RegisterWidth::Sixteen, 0x1234).unwrap();
        assert_eq!(op, RegisterOp::reg16(0x0202, 0x1234));
        assert_eq!(
            RegisterOp::new(Address::new(0x0100), RegisterWidth::Eight, 0x100),
            Err(LibraryError::InvalidData(
                "register value does not fit in its width"
            ))
        );
    }

    #[test]
    fn value_bytes_are_big_endian() {
        assert_eq!(RegisterOp::reg16(0x0340, 0x09BC).value_bytes().as_slice(), [0x09, 0xBC]);
        assert_eq!(RegisterOp::reg8(0x0100, 0x01).value_bytes().as_slice(), [0x01]);
    }

    #[test]
    fn end_address() {
        assert_eq!(
            RegisterOp::reg16(0x020E, 0).end_address(),
            Some(Address::new(0x0210))
        );
        assert_eq!(RegisterOp::reg8(0xFFFF, 0).end_address(), None);
    }

    #[test]
    fn register_width_raw() {
        assert_eq!(u8::from(RegisterWidth::Sixteen), 2);
        assert!(matches!(
            RegisterWidth::try_from(1u8),
            Ok(RegisterWidth::Eight)
        ));
        assert!(RegisterWidth::try_from(3u8).is_err());
    }

    #[test]
    fn orientation_from_raw() {
        let orientation = OrientationRegister::from(0xFE);
        assert!(!orientation.horizontal_flip());
        assert!(orientation.vertical_flip());
        let raw: u8 = OrientationRegister::new(true, false).into();
        assert_eq!(raw, 0x01);
    }

    #[test]
    fn orientation_preserves_reserved_bits() {
        let merged = merge_masked(0xA4, OrientationRegister::new(true, true));
        assert_eq!(merged, 0xA7);
        let merged = merge_masked(0xA7, OrientationRegister::new(false, false));
        assert_eq!(merged, 0xA4);
    }

    #[test]
    fn address_debug() {
        assert_eq!(format!("{:?}", IMAGE_ORIENTATION), "Address(0x0101)");
    }
}
