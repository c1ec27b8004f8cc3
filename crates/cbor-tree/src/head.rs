//! Item heads: the initial byte and its variable width argument.
//!
//! Every data item starts with an initial byte. The high 3 bits are the major
//! type and the low 5 bits either hold the argument inline (0 to 23), select a
//! 1, 2, 4, or 8 byte big-endian argument (24 to 27), or mark an indefinite
//! length item (31).

use crate::{
    error::{Error, ErrorKind, Result},
    read::{uint_from_bytes, SliceRead},
};

/// Mask for the major type bits of an initial byte.
pub(crate) const MAJOR_TYPE_MASK: u8 = 0b1110_0000;
/// Mask for the argument bits of an initial byte.
pub(crate) const ARG_MASK: u8 = 0b0001_1111;

/// Largest argument stored directly in the initial byte.
pub(crate) const ARG_INLINE_MAX: u8 = 23;
/// The argument is in the following byte.
pub(crate) const ARG_U8: u8 = 24;
/// The argument is in the following 2 bytes.
pub(crate) const ARG_U16: u8 = 25;
/// The argument is in the following 4 bytes.
pub(crate) const ARG_U32: u8 = 26;
/// The argument is in the following 8 bytes.
pub(crate) const ARG_U64: u8 = 27;
/// Indefinite length item or, for major type 7, the break marker.
pub(crate) const ARG_INDEFINITE: u8 = 31;

/// Returns the major type (0 to 7) of an initial byte.
#[inline]
#[must_use]
pub(crate) const fn major_type(init_byte: u8) -> u8 {
    init_byte >> 5
}

/// The decoded argument of an item head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Argument {
    /// A value, a length, or a tag number.
    Value(u64),
    /// The item has an indefinite length and is closed by a break marker.
    Indefinite,
}

/// Reads the argument for `init_byte`, consuming any following argument bytes.
///
/// `head_offset` is the position of the initial byte and is used for error
/// reporting. Whether [`Argument::Indefinite`] is acceptable depends on the
/// major type and is left to the caller.
pub(crate) fn read_argument(
    read: &mut SliceRead<'_>,
    init_byte: u8,
    head_offset: usize,
) -> Result<Argument> {
    let arg_val = init_byte & ARG_MASK;
    let value = match arg_val {
        0..=ARG_INLINE_MAX => u64::from(arg_val),
        ARG_U8 => u64::from(read.next()?),
        ARG_U16 => uint_from_bytes(read.take(2)?),
        ARG_U32 => uint_from_bytes(read.take(4)?),
        ARG_U64 => uint_from_bytes(read.take(8)?),
        ARG_INDEFINITE => return Ok(Argument::Indefinite),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidSubtype {
                    major_type: major_type(init_byte),
                    subtype: arg_val,
                },
                head_offset,
            ))
        }
    };
    Ok(Argument::Value(value))
}

/// An encoded item head, at most 9 bytes long.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Head {
    buf: [u8; 9],
    len: usize,
}

impl Head {
    /// Encodes `value` with the narrowest argument width.
    ///
    /// `ib` is the initial byte with only the major type bits set.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(ib: u8, value: u64) -> Self {
        debug_assert_eq!(ib & ARG_MASK, 0);

        let mut buf = [0; 9];
        let len = if value <= u64::from(ARG_INLINE_MAX) {
            buf[0] = ib | value as u8;
            1
        } else if let Ok(value) = u8::try_from(value) {
            buf[0] = ib | ARG_U8;
            buf[1] = value;
            2
        } else if let Ok(value) = u16::try_from(value) {
            buf[0] = ib | ARG_U16;
            buf[1..3].copy_from_slice(&value.to_be_bytes());
            3
        } else if let Ok(value) = u32::try_from(value) {
            buf[0] = ib | ARG_U32;
            buf[1..5].copy_from_slice(&value.to_be_bytes());
            5
        } else {
            buf[0] = ib | ARG_U64;
            buf[1..9].copy_from_slice(&value.to_be_bytes());
            9
        };

        Head { buf, len }
    }

    /// Head for an indefinite length item.
    #[must_use]
    pub(crate) fn indefinite(ib: u8) -> Self {
        let mut buf = [0; 9];
        buf[0] = ib | ARG_INDEFINITE;
        Head { buf, len: 1 }
    }

    /// The encoded bytes.
    #[inline]
    #[must_use]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IB_ARRAY_MIN, IB_NEG_INT_MIN, IB_UINT_MIN};

    use hex_literal::hex;
    use proptest::prelude::*;

    fn read_one(input: &[u8]) -> Result<Argument> {
        let mut read = SliceRead::new(input);
        let init_byte = read.next()?;
        read_argument(&mut read, init_byte, 0)
    }

    #[test]
    fn test_read_inline() -> Result<()> {
        assert_eq!(read_one(&hex!("00"))?, Argument::Value(0));
        assert_eq!(read_one(&hex!("17"))?, Argument::Value(23));
        Ok(())
    }

    #[test]
    fn test_read_widths() -> Result<()> {
        assert_eq!(read_one(&hex!("18 18"))?, Argument::Value(24));
        assert_eq!(read_one(&hex!("19 03 e8"))?, Argument::Value(1000));
        assert_eq!(read_one(&hex!("1a 00 0f 42 40"))?, Argument::Value(1_000_000));
        assert_eq!(
            read_one(&hex!("1b 00 00 00 e8 d4 a5 10 00"))?,
            Argument::Value(1_000_000_000_000)
        );
        Ok(())
    }

    #[test]
    fn test_read_indefinite() -> Result<()> {
        assert_eq!(read_one(&hex!("9f"))?, Argument::Indefinite);
        Ok(())
    }

    #[test]
    fn test_read_reserved() {
        for init_byte in [0x1c, 0x1d, 0x1e] {
            let err = read_one(&[init_byte]).unwrap_err();
            assert!(matches!(
                err.kind(),
                ErrorKind::InvalidSubtype { major_type: 0, subtype } if *subtype == init_byte & ARG_MASK
            ));
        }
    }

    #[test]
    fn test_read_truncated() {
        let err = read_one(&hex!("1a 00 0f")).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::TruncatedInput {
                needed: 4,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_head_minimal_width() {
        assert_eq!(Head::new(IB_UINT_MIN, 0).as_slice(), &hex!("00"));
        assert_eq!(Head::new(IB_UINT_MIN, 23).as_slice(), &hex!("17"));
        assert_eq!(Head::new(IB_UINT_MIN, 24).as_slice(), &hex!("18 18"));
        assert_eq!(Head::new(IB_UINT_MIN, 255).as_slice(), &hex!("18 ff"));
        assert_eq!(Head::new(IB_UINT_MIN, 256).as_slice(), &hex!("19 01 00"));
        assert_eq!(
            Head::new(IB_UINT_MIN, 65_536).as_slice(),
            &hex!("1a 00 01 00 00")
        );
        assert_eq!(
            Head::new(IB_UINT_MIN, u64::MAX).as_slice(),
            &hex!("1b ff ff ff ff ff ff ff ff")
        );
        assert_eq!(Head::new(IB_NEG_INT_MIN, 999).as_slice(), &hex!("39 03 e7"));
        assert_eq!(Head::indefinite(IB_ARRAY_MIN).as_slice(), &hex!("9f"));
    }

    fn expected_len(v: u64) -> usize {
        match v {
            0..=23 => 1,
            24..=0xff => 2,
            0x100..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    proptest! {
        #[test]
        fn test_head_round_trip(v in any::<u64>()) {
            let head = Head::new(IB_UINT_MIN, v);
            prop_assert_eq!(head.as_slice().len(), expected_len(v));
            prop_assert_eq!(read_one(head.as_slice())?, Argument::Value(v));
        }
    }
}
