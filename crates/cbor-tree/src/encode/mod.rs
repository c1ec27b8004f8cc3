//! Encoder for a [`Value`] tree into binary data.
//!
//! Integers, lengths, and tag numbers always use the narrowest argument width.
//! Floats use the narrowest width allowed by [`FloatWidth`] which represents
//! the value exactly. Arrays, maps, and strings are written with definite
//! lengths unless they are written piece by piece with the streaming methods
//! on [`Encoder`].
//!
//! ```
//! use cbor_tree::{to_vec, Value};
//!
//! let value = Value::from(vec![Value::from(1), Value::from("a")]);
//! assert_eq!(to_vec(&value)?, [0x82, 0x01, 0x61, 0x61]);
//! # Ok::<(), cbor_tree::Error>(())
//! ```

use std::io;

use crate::{decode::DEFAULT_MAX_DEPTH, error::Result, FloatWidth, Value};

mod encoders;

pub use encoders::Encoder;

/// How timestamps are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRepresentation {
    /// Tag 0 with RFC 3339 text
    #[default]
    Text,
    /// Tag 1 with whole seconds since the epoch
    ///
    /// Any fraction of a second is truncated toward negative infinity.
    IntegerSeconds,
    /// Tag 1 with seconds since the epoch as a float
    FloatSeconds,
}

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
    /// Width selection for floats.
    pub float_width: FloatWidth,
    /// How timestamps are written.
    pub time_representation: TimeRepresentation,
    /// Maximum nesting depth of arrays, maps, and indefinite length items.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            float_width: FloatWidth::default(),
            time_representation: TimeRepresentation::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    /// Sets the width selection for floats.
    #[must_use]
    pub const fn with_float_width(mut self, float_width: FloatWidth) -> Self {
        self.float_width = float_width;
        self
    }

    /// Sets how timestamps are written.
    #[must_use]
    pub const fn with_time_representation(
        mut self,
        time_representation: TimeRepresentation,
    ) -> Self {
        self.time_representation = time_representation;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Encodes a value with the options into a new vector.
///
/// # Errors
///
/// Fails if the value is nested too deeply or cannot be represented (see
/// [`ErrorKind::UnsupportedValue`][crate::ErrorKind::UnsupportedValue]).
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut enc = Encoder::with_options(Vec::new(), *options);
    enc.encode(value)?;
    enc.finish()
}

/// Encodes a value with the default options into a new vector.
///
/// # Errors
///
/// Fails if the value is nested too deeply or cannot be represented.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    encode(value, &EncodeOptions::default())
}

/// Encodes a value with the options into a writer.
///
/// # Errors
///
/// Fails if the value cannot be encoded or the writer fails.
pub fn to_writer<W>(writer: W, value: &Value, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
{
    let mut enc = Encoder::with_options(writer, *options);
    enc.encode(value)?;
    enc.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use chrono::{DateTime, FixedOffset, TimeZone};
    use hex_literal::hex;
    use num_bigint::{BigInt, Sign};
    use proptest::prelude::*;

    use crate::{decode, error::ErrorKind, value::Int};

    fn ts(secs: i64, nanos: u32) -> Value {
        ts_with_offset(secs, nanos, 0)
    }

    fn ts_with_offset(secs: i64, nanos: u32, offset: i32) -> Value {
        Value::Timestamp(
            FixedOffset::east_opt(offset)
                .unwrap()
                .timestamp_opt(secs, nanos)
                .unwrap(),
        )
    }

    #[test]
    fn test_encode_uint() -> Result<()> {
        assert_eq!(to_vec(&Value::from(0))?, hex!("00"));
        assert_eq!(to_vec(&Value::from(10))?, hex!("0a"));
        assert_eq!(to_vec(&Value::from(23))?, hex!("17"));
        assert_eq!(to_vec(&Value::from(24))?, hex!("18 18"));
        assert_eq!(to_vec(&Value::from(100))?, hex!("18 64"));
        assert_eq!(to_vec(&Value::from(1000))?, hex!("19 03 e8"));
        assert_eq!(to_vec(&Value::from(1_000_000))?, hex!("1a 00 0f 42 40"));
        assert_eq!(
            to_vec(&Value::from(1_000_000_000_000_u64))?,
            hex!("1b 00 00 00 e8 d4 a5 10 00")
        );
        assert_eq!(
            to_vec(&Value::from(u64::MAX))?,
            hex!("1b ff ff ff ff ff ff ff ff")
        );
        Ok(())
    }

    #[test]
    fn test_encode_neg_int() -> Result<()> {
        assert_eq!(to_vec(&Value::from(-1))?, hex!("20"));
        assert_eq!(to_vec(&Value::from(-10))?, hex!("29"));
        assert_eq!(to_vec(&Value::from(-100))?, hex!("38 63"));
        assert_eq!(to_vec(&Value::from(-1000))?, hex!("39 03 e7"));
        assert_eq!(
            to_vec(&Value::Int(Int::Neg(u64::MAX)))?,
            hex!("3b ff ff ff ff ff ff ff ff")
        );
        Ok(())
    }

    #[test]
    fn test_encode_bigint_boundaries() -> Result<()> {
        let two_64: BigInt = BigInt::from(u64::MAX) + 1;
        assert_eq!(
            to_vec(&Value::from(two_64.clone() - 1))?,
            hex!("1b ff ff ff ff ff ff ff ff")
        );
        assert_eq!(
            to_vec(&Value::from(two_64.clone()))?,
            hex!("c2 49 01 00 00 00 00 00 00 00 00")
        );
        assert_eq!(
            to_vec(&Value::from(-two_64.clone()))?,
            hex!("3b ff ff ff ff ff ff ff ff")
        );
        assert_eq!(
            to_vec(&Value::from(-two_64 - 1))?,
            hex!("c3 49 01 00 00 00 00 00 00 00 00")
        );
        Ok(())
    }

    #[test]
    fn test_small_bigint_round_trips() -> Result<()> {
        for n in [BigInt::from(5), BigInt::from(-5), BigInt::from(u64::MAX)] {
            let v = Value::from(n);
            let output = to_vec(&v)?;
            assert_eq!(decode(&output)?, v);
        }
        assert_eq!(to_vec(&Value::from(BigInt::from(5)))?, hex!("05"));
        assert_eq!(to_vec(&Value::from(BigInt::from(-5)))?, hex!("24"));
        Ok(())
    }

    #[test]
    fn test_encode_floats_auto() -> Result<()> {
        assert_eq!(to_vec(&Value::from(0.0))?, hex!("f9 00 00"));
        assert_eq!(to_vec(&Value::from(-0.0))?, hex!("f9 80 00"));
        assert_eq!(to_vec(&Value::from(1.0))?, hex!("f9 3c 00"));
        assert_eq!(to_vec(&Value::from(f64::INFINITY))?, hex!("f9 7c 00"));
        assert_eq!(to_vec(&Value::from(f64::NEG_INFINITY))?, hex!("f9 fc 00"));
        assert_eq!(to_vec(&Value::from(f64::NAN))?, hex!("f9 7e 00"));
        assert_eq!(to_vec(&Value::from(1.1))?, hex!("fb 3f f1 99 99 99 99 99 9a"));
        assert_eq!(to_vec(&Value::from(100_000.0))?, hex!("fa 47 c3 50 00"));
        assert_eq!(
            to_vec(&Value::from(3.402_823_466_385_288_6e38))?,
            hex!("fa 7f 7f ff ff")
        );
        assert_eq!(to_vec(&Value::from(1.0e300))?, hex!("fb 7e 37 e4 3c 88 00 75 9c"));
        assert_eq!(to_vec(&Value::from(1.5))?, hex!("fa 3f c0 00 00"));
        Ok(())
    }

    #[test]
    fn test_encode_floats_explicit_width() -> Result<()> {
        let half = EncodeOptions::default().with_float_width(FloatWidth::Half);
        assert_eq!(encode(&Value::from(1.5), &half)?, hex!("f9 3e 00"));
        assert_eq!(encode(&Value::from(65504.0), &half)?, hex!("f9 7b ff"));
        assert_eq!(encode(&Value::from(-4.0), &half)?, hex!("f9 c4 00"));
        assert_eq!(encode(&Value::from(100_000.0), &half)?, hex!("fa 47 c3 50 00"));

        let double = EncodeOptions::default().with_float_width(FloatWidth::Double);
        assert_eq!(
            encode(&Value::from(100_000.0), &double)?,
            hex!("fb 40 f8 6a 00 00 00 00 00")
        );
        assert_eq!(encode(&Value::from(1.0), &double)?, hex!("f9 3c 00"));
        Ok(())
    }

    #[test]
    fn test_encode_strings() -> Result<()> {
        assert_eq!(to_vec(&Value::from(Vec::<u8>::new()))?, hex!("40"));
        assert_eq!(to_vec(&Value::from(vec![1_u8, 2, 3, 4]))?, hex!("44 01 02 03 04"));
        assert_eq!(to_vec(&Value::from(""))?, hex!("60"));
        assert_eq!(to_vec(&Value::from("IETF"))?, hex!("64 49 45 54 46"));
        assert_eq!(to_vec(&Value::from("\u{00fc}"))?, hex!("62 c3 bc"));
        Ok(())
    }

    #[test]
    fn test_encode_aggregates() -> Result<()> {
        let value = Value::from(vec![
            Value::from(1),
            Value::from(vec![Value::from(2), Value::from(3)]),
            Value::from(vec![Value::from(4), Value::from(5)]),
        ]);
        assert_eq!(to_vec(&value)?, hex!("83 01 82 02 03 82 04 05"));

        let mut map = BTreeMap::new();
        map.insert(Value::from(1), Value::from(2));
        map.insert(Value::from(3), Value::from(4));
        assert_eq!(to_vec(&Value::Map(map))?, hex!("a2 01 02 03 04"));

        let mut map = BTreeMap::new();
        map.insert(Value::from("a"), Value::from(vec![Value::from(2), Value::from(3)]));
        assert_eq!(to_vec(&Value::from(map))?, hex!("a1 61 61 82 02 03"));
        Ok(())
    }

    #[test]
    fn test_encode_simple() -> Result<()> {
        assert_eq!(to_vec(&Value::Bool(false))?, hex!("f4"));
        assert_eq!(to_vec(&Value::Bool(true))?, hex!("f5"));
        assert_eq!(to_vec(&Value::Null)?, hex!("f6"));
        assert_eq!(to_vec(&Value::Undefined)?, hex!("f7"));
        Ok(())
    }

    #[test]
    fn test_encode_timestamp() -> Result<()> {
        let t = ts(1_363_896_240, 0);
        assert_eq!(
            to_vec(&t)?,
            hex!("c0 74 32 30 31 33 2d 30 33 2d 32 31 54 32 30 3a 30 34 3a 30 30 5a")
        );

        let options = EncodeOptions::default()
            .with_time_representation(TimeRepresentation::IntegerSeconds);
        assert_eq!(encode(&t, &options)?, hex!("c1 1a 51 4b 67 b0"));
        assert_eq!(
            encode(&ts(1_363_896_240, 500_000_000), &options)?,
            hex!("c1 1a 51 4b 67 b0")
        );

        let options =
            EncodeOptions::default().with_time_representation(TimeRepresentation::FloatSeconds);
        assert_eq!(
            encode(&ts(1_363_896_240, 500_000_000), &options)?,
            hex!("c1 fb 41 d4 52 d9 ec 20 00 00")
        );
        Ok(())
    }

    #[test]
    fn test_encode_timestamp_text_keeps_offset() -> Result<()> {
        let t = DateTime::parse_from_rfc3339("2013-03-21T22:04:00.25+02:00").unwrap();
        let output = to_vec(&Value::Timestamp(t))?;
        assert_eq!(output[0], 0xc0);
        assert_eq!(&output[2..], b"2013-03-21T22:04:00.250+02:00");
        assert_eq!(decode(&output)?, Value::Timestamp(t));
        Ok(())
    }

    #[test]
    fn test_encode_timestamp_sub_minute_offset() -> Result<()> {
        let t = FixedOffset::east_opt(3601)
            .unwrap()
            .timestamp_opt(1_363_896_240, 0)
            .unwrap();
        let output = to_vec(&Value::Timestamp(t))?;
        assert_eq!(&output[2..], b"2013-03-21T20:04:00Z");
        assert_eq!(decode(&output)?, Value::Timestamp(t));

        let t = FixedOffset::west_opt(59)
            .unwrap()
            .timestamp_opt(1_363_896_240, 0)
            .unwrap();
        assert_eq!(decode(&to_vec(&Value::Timestamp(t))?)?, Value::Timestamp(t));
        Ok(())
    }

    #[test]
    fn test_encode_timestamp_year_out_of_range() {
        let t = DateTime::parse_from_rfc3339("9999-12-31T23:59:59Z").unwrap()
            + chrono::Duration::days(1);
        let err = to_vec(&Value::Timestamp(t)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedValue(_)));

        let options = EncodeOptions::default()
            .with_time_representation(TimeRepresentation::IntegerSeconds);
        assert!(encode(&Value::Timestamp(t), &options).is_ok());
    }

    #[test]
    fn test_encode_uri() -> Result<()> {
        let url = url::Url::parse("http://www.example.com").unwrap();
        assert_eq!(
            to_vec(&Value::from(url))?,
            hex!("d8 20 77 68 74 74 70 3a 2f 2f 77 77 77 2e 65 78 61 6d 70 6c 65 2e 63 6f 6d 2f")
        );
        Ok(())
    }

    #[test]
    fn test_encode_max_depth() -> Result<()> {
        let nested = Value::from(vec![Value::from(vec![Value::from(1)])]);
        let options = EncodeOptions::default().with_max_depth(2);
        assert_eq!(encode(&nested, &options)?, hex!("81 81 01"));

        let options = EncodeOptions::default().with_max_depth(1);
        let err = encode(&nested, &options).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NestingTooDeep { max_depth: 1 }));
        assert_eq!(err.byte_offset(), 1);
        Ok(())
    }

    #[test]
    fn test_to_writer() -> Result<()> {
        let mut output = Vec::new();
        to_writer(&mut output, &Value::from(1000), &EncodeOptions::default())?;
        assert_eq!(output, hex!("19 03 e8"));
        Ok(())
    }

    #[test]
    fn test_to_writer_error() {
        let mut buf = [0_u8; 2];
        let err = to_writer(&mut buf[..], &Value::from(1000), &EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<u64>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            any::<i128>().prop_map(Value::from),
            any::<f64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            Just(Value::Null),
            Just(Value::Undefined),
            ".*".prop_map(Value::from),
            prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::from),
            (0_i64..253_402_214_400, 0_u32..1_000_000_000, -86_399_i32..=86_399)
                .prop_map(|(s, n, offset)| ts_with_offset(s, n, offset)),
            (any::<bool>(), prop::collection::vec(any::<u8>(), 0..24)).prop_map(|(neg, b)| {
                let sign = if neg { Sign::Minus } else { Sign::Plus };
                Value::from(BigInt::from_bytes_be(sign, &b))
            }),
            "[a-z]{1,12}".prop_map(|host| {
                Value::from(url::Url::parse(&format!("http://{host}.example/")).unwrap())
            }),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map(inner.clone(), inner, 0..8).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_round_trip(v in arb_value()) {
            let output = to_vec(&v)?;
            prop_assert_eq!(decode(&output)?, v);
        }

        #[test]
        fn test_round_trip_every_float_width(v in any::<f64>()) {
            for float_width in [FloatWidth::Auto, FloatWidth::Half, FloatWidth::Single, FloatWidth::Double] {
                let options = EncodeOptions::default().with_float_width(float_width);
                let output = encode(&Value::from(v), &options)?;
                prop_assert_eq!(decode(&output)?, Value::from(v));
            }
        }

        #[test]
        fn test_minimal_width(v in any::<u64>()) {
            let output = to_vec(&Value::from(v))?;
            let expected = match v {
                0..=23 => 1,
                24..=0xff => 2,
                0x100..=0xffff => 3,
                0x1_0000..=0xffff_ffff => 5,
                _ => 9,
            };
            prop_assert_eq!(output.len(), expected);
        }
    }
}
