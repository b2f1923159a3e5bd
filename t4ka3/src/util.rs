// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// This is a very small reimplementation of [bytes::Buf] with just the parts needed for this
/// crate.
///
/// [bytes::Buf]: https://docs.rs/bytes/*/bytes/trait.Buf.html
pub(crate) trait Buffer {
    fn get_u8(&mut self) -> u8;
    fn get_u16(&mut self) -> u16;
}

impl Buffer for &[u8] {
    fn get_u8(&mut self) -> u8 {
        let (byte, rest) = self.split_at(1);
        *self = rest;
        byte[0]
    }

    fn get_u16(&mut self) -> u16 {
        let (bytes, rest) = self.split_at(2);
        *self = rest;
        u16::from_be_bytes([bytes[0], bytes[1]])
    }
}

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}

/// Set or clear the n-th bit.
pub(crate) fn with_bit<B>(value: B, index: usize, set: bool) -> B
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    let bit = B::one() << index;
    if set {
        value | bit
    } else {
        value & !bit
    }
}

#[cfg(test)]
mod test {
    use super::Buffer;

    #[test]
    fn buffer_get_u8() {
        let data = b"\xde\xad\xbe\xef";
        let mut buf = &data[..];
        let v = buf.get_u8();
        assert_eq!(v, 0xde);
        assert_eq!(buf, &data[1..]);
    }

    #[test]
    fn buffer_get_u16() {
        let data = b"\xde\xad\xbe\xef";
        let mut buf = &data[..];
        let v = buf.get_u16();
        assert_eq!(v, 0xdead);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf, &data[2..]);
    }

    #[test]
    fn is_bit_set() {
        for n in 0..8 {
            let value: u8 = 1 << n;
            assert!(
                super::is_bit_set(value, n),
                "is_bit_set was incorrect for bit {}",
                n
            );
        }
    }

    #[test]
    fn with_bit() {
        assert_eq!(super::with_bit(0xf0u8, 0, true), 0xf1);
        assert_eq!(super::with_bit(0xf1u8, 0, false), 0xf0);
        assert_eq!(super::with_bit(0x02u8, 1, true), 0x02);
    }
}
