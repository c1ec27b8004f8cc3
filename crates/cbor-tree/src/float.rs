//! IEEE 754 half, single, and double precision floats.
//!
//! Decoding accepts any of the three widths. Encoding picks the width with
//! [`FloatWidth`]:
//!
//! - NaN, `0.0`, `-0.0`, `1.0`, `Infinity`, and `-Infinity` are always
//!   written with fixed half precision bit patterns.
//! - Every other value is written with the narrowest width allowed by the
//!   policy which represents it exactly.
//!
//! The automatic policy never writes an arbitrary value at half precision even
//! when it would fit. Request [`FloatWidth::Half`] for the most compact output.

use half::f16;

/// Canonical half precision NaN.
pub(crate) const HALF_NAN: u16 = 0x7e00;
/// Half precision positive zero.
pub(crate) const HALF_ZERO: u16 = 0x0000;
/// Half precision negative zero.
pub(crate) const HALF_NEG_ZERO: u16 = 0x8000;
/// Half precision one.
pub(crate) const HALF_ONE: u16 = 0x3c00;
/// Half precision positive infinity.
pub(crate) const HALF_INFINITY: u16 = 0x7c00;
/// Half precision negative infinity.
pub(crate) const HALF_NEG_INFINITY: u16 = 0xfc00;

/// Width selection for encoded floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    /// Single precision when it is exact, otherwise double precision.
    #[default]
    Auto,
    /// Half precision when it is exact, otherwise the narrowest exact width.
    Half,
    /// Single precision when it is exact, otherwise double precision.
    Single,
    /// Always double precision.
    Double,
}

/// An encoded float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EncodedFloat {
    /// 2 byte half precision bits
    Half(u16),
    /// 4 byte single precision bits
    Single(u32),
    /// 8 byte double precision bits
    Double(u64),
}

/// Decodes half precision bits.
///
/// The exponent field selects subnormal (`mantissa * 2^-24`), non-finite, or
/// normal (`(mantissa + 1024) * 2^(exponent - 25)`) values.
#[must_use]
pub(crate) fn f64_from_half_bits(bits: u16) -> f64 {
    f16::from_bits(bits).to_f64()
}

/// Decodes big-endian single precision bytes.
#[inline]
#[must_use]
pub(crate) fn f64_from_single_bytes(bytes: [u8; 4]) -> f64 {
    f64::from(f32::from_be_bytes(bytes))
}

/// Decodes big-endian double precision bytes.
#[inline]
#[must_use]
pub(crate) fn f64_from_double_bytes(bytes: [u8; 8]) -> f64 {
    f64::from_be_bytes(bytes)
}

/// The fixed half precision pattern for NaN and the special constants.
fn special_half_bits(v: f64) -> Option<u16> {
    if v.is_nan() {
        Some(HALF_NAN)
    } else if v == 0.0 {
        Some(if v.is_sign_negative() {
            HALF_NEG_ZERO
        } else {
            HALF_ZERO
        })
    } else if v == 1.0 {
        Some(HALF_ONE)
    } else if v.is_infinite() {
        Some(if v.is_sign_negative() {
            HALF_NEG_INFINITY
        } else {
            HALF_INFINITY
        })
    } else {
        None
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn exact_single(v: f64) -> Option<u32> {
    let single = v as f32;
    (f64::from(single) == v).then(|| single.to_bits())
}

#[allow(clippy::float_cmp)]
fn exact_half(v: f64) -> Option<u16> {
    let half = f16::from_f64(v);
    (half.to_f64() == v).then(|| half.to_bits())
}

/// Selects the encoded form of `v` for the width policy.
#[must_use]
pub(crate) fn encode_f64(v: f64, width: FloatWidth) -> EncodedFloat {
    if let Some(bits) = special_half_bits(v) {
        return EncodedFloat::Half(bits);
    }

    let encoded = match width {
        FloatWidth::Auto | FloatWidth::Single => exact_single(v).map(EncodedFloat::Single),
        FloatWidth::Half => exact_half(v)
            .map(EncodedFloat::Half)
            .or_else(|| exact_single(v).map(EncodedFloat::Single)),
        FloatWidth::Double => None,
    };

    encoded.unwrap_or_else(|| {
        if width != FloatWidth::Double {
            log::debug!("float {v} needs double precision, widening from {width:?}");
        }
        EncodedFloat::Double(v.to_bits())
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_half_decode() {
        assert_eq!(f64_from_half_bits(0x0000), 0.0);
        assert!(f64_from_half_bits(0x8000).is_sign_negative());
        assert_eq!(f64_from_half_bits(0x3c00), 1.0);
        assert_eq!(f64_from_half_bits(0x3e00), 1.5);
        assert_eq!(f64_from_half_bits(0x7bff), 65504.0);
        assert_eq!(f64_from_half_bits(0xc400), -4.0);
        assert_eq!(f64_from_half_bits(0x7c00), f64::INFINITY);
        assert_eq!(f64_from_half_bits(0xfc00), f64::NEG_INFINITY);
        assert!(f64_from_half_bits(0x7e00).is_nan());
    }

    #[test]
    fn test_half_decode_subnormal() {
        assert_eq!(f64_from_half_bits(0x0001), 5.960_464_477_539_063e-8);
        assert_eq!(f64_from_half_bits(0x0400), 0.000_061_035_156_25);
    }

    #[test]
    fn test_single_and_double_decode() {
        assert_eq!(f64_from_single_bytes([0x47, 0xc3, 0x50, 0x00]), 100_000.0);
        assert_eq!(
            f64_from_single_bytes([0x7f, 0x7f, 0xff, 0xff]),
            3.402_823_466_385_288_6e38
        );
        assert_eq!(
            f64_from_double_bytes([0x7e, 0x37, 0xe4, 0x3c, 0x88, 0x00, 0x75, 0x9c]),
            1.0e300
        );
    }

    #[test]
    fn test_specials_always_half() {
        for width in [
            FloatWidth::Auto,
            FloatWidth::Half,
            FloatWidth::Single,
            FloatWidth::Double,
        ] {
            assert_eq!(encode_f64(0.0, width), EncodedFloat::Half(HALF_ZERO));
            assert_eq!(encode_f64(-0.0, width), EncodedFloat::Half(HALF_NEG_ZERO));
            assert_eq!(encode_f64(1.0, width), EncodedFloat::Half(HALF_ONE));
            assert_eq!(encode_f64(f64::NAN, width), EncodedFloat::Half(HALF_NAN));
            assert_eq!(
                encode_f64(f64::INFINITY, width),
                EncodedFloat::Half(HALF_INFINITY)
            );
            assert_eq!(
                encode_f64(f64::NEG_INFINITY, width),
                EncodedFloat::Half(HALF_NEG_INFINITY)
            );
        }
    }

    #[test]
    fn test_auto_width() {
        assert_eq!(
            encode_f64(100_000.0, FloatWidth::Auto),
            EncodedFloat::Single(0x47c3_5000)
        );
        assert_eq!(
            encode_f64(1.5, FloatWidth::Auto),
            EncodedFloat::Single(1.5_f32.to_bits())
        );
        assert_eq!(
            encode_f64(1.0e300, FloatWidth::Auto),
            EncodedFloat::Double(1.0e300_f64.to_bits())
        );
        assert_eq!(
            encode_f64(1.1, FloatWidth::Auto),
            EncodedFloat::Double(0x3ff1_9999_9999_999a)
        );
    }

    #[test]
    fn test_half_width() {
        assert_eq!(encode_f64(1.5, FloatWidth::Half), EncodedFloat::Half(0x3e00));
        assert_eq!(
            encode_f64(65504.0, FloatWidth::Half),
            EncodedFloat::Half(0x7bff)
        );
        assert_eq!(
            encode_f64(5.960_464_477_539_063e-8, FloatWidth::Half),
            EncodedFloat::Half(0x0001)
        );
        assert_eq!(
            encode_f64(100_000.0, FloatWidth::Half),
            EncodedFloat::Single(0x47c3_5000)
        );
        assert_eq!(
            encode_f64(-4.1, FloatWidth::Half),
            EncodedFloat::Double(0xc010_6666_6666_6666)
        );
    }

    #[test]
    fn test_double_width() {
        assert_eq!(
            encode_f64(100_000.0, FloatWidth::Double),
            EncodedFloat::Double(100_000.0_f64.to_bits())
        );
    }

    fn decode(encoded: EncodedFloat) -> f64 {
        match encoded {
            EncodedFloat::Half(bits) => f64_from_half_bits(bits),
            EncodedFloat::Single(bits) => f64_from_single_bytes(bits.to_be_bytes()),
            EncodedFloat::Double(bits) => f64_from_double_bytes(bits.to_be_bytes()),
        }
    }

    proptest! {
        #[test]
        fn test_never_lossy(v in any::<f64>().prop_filter("not NaN", |v| !v.is_nan())) {
            for width in [FloatWidth::Auto, FloatWidth::Half, FloatWidth::Single, FloatWidth::Double] {
                let decoded = decode(encode_f64(v, width));
                prop_assert_eq!(decoded.to_bits(), v.to_bits());
            }
        }
    }
}
