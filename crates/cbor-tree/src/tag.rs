//! Tag interpretation.
//!
//! A tag is a number in front of an item which gives the item a higher level
//! meaning. Only a fixed set of tags is interpreted:
//!
//! | tag | item | value |
//! |-----|------|-------|
//! | 0 | text string | [`Value::Timestamp`] from RFC 3339 text |
//! | 1 | integer or float | [`Value::Timestamp`] from seconds since the epoch |
//! | 2 | byte string | unsigned big-endian integer |
//! | 3 | byte string | `-1 - n` for the unsigned big-endian integer `n` |
//! | 32 | text string | [`Value::Uri`] |
//!
//! Any other tag, or one of the above in front of a different kind of item,
//! is handled by the [`TagPolicy`].

use chrono::DateTime;
use num_bigint::{BigInt, BigUint};
use num_traits::One;
use url::Url;

use crate::{
    error::{Error, ErrorKind, Result},
    value::{Float, Int},
    Value,
};

/// Tag number
pub type Num = u64;

/// Standard date/time string
pub(crate) const TAG_DATETIME_STR: Num = 0;
/// Epoch-based date/time
pub(crate) const TAG_EPOCH_TIME: Num = 1;
/// Unsigned bignum
pub(crate) const TAG_BIGNUM: Num = 2;
/// Negative bignum
pub(crate) const TAG_NEG_BIGNUM: Num = 3;
/// URI text
pub(crate) const TAG_URI: Num = 32;

/// How the decoder treats a tag which it does not interpret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TagPolicy {
    /// The tag is dropped and the tagged item is decoded as if it were
    /// untagged.
    #[default]
    PassThrough,
    /// Decoding fails with [`ErrorKind::UnsupportedTag`].
    Reject,
}

/// Applies the tag `num` to a fully decoded item.
///
/// `head_offset` is the position of the tag head in the input.
pub(crate) fn apply(
    num: Num,
    value: Value,
    policy: TagPolicy,
    head_offset: usize,
) -> Result<Value> {
    let value = match (num, value) {
        (TAG_DATETIME_STR, Value::TextStr(s)) => DateTime::parse_from_rfc3339(&s)
            .map(Value::Timestamp)
            .map_err(|e| {
                Error::new(
                    ErrorKind::InvalidTimestamp(format!("{s:?}: {e}")),
                    head_offset,
                )
            })?,
        (TAG_EPOCH_TIME, Value::Int(n)) => epoch_from_int(n, head_offset)?,
        (TAG_EPOCH_TIME, Value::Float(v)) => epoch_from_float(v, head_offset)?,
        (TAG_BIGNUM, Value::ByteStr(b)) => Value::from(BigInt::from(BigUint::from_bytes_be(&b))),
        (TAG_NEG_BIGNUM, Value::ByteStr(b)) => {
            Value::from(-BigInt::from(BigUint::from_bytes_be(&b)) - BigInt::one())
        }
        (TAG_URI, Value::TextStr(s)) => Url::parse(&s)
            .map(Value::Uri)
            .map_err(|e| Error::new(ErrorKind::InvalidUri(e), head_offset))?,
        (num, value) => match policy {
            TagPolicy::PassThrough => {
                log::debug!("passing through tag {num} at byte offset {head_offset}");
                value
            }
            TagPolicy::Reject => {
                return Err(Error::new(
                    ErrorKind::UnsupportedTag { tag: num },
                    head_offset,
                ))
            }
        },
    };
    Ok(value)
}

fn epoch_from_int(n: Int, head_offset: usize) -> Result<Value> {
    i64::try_from(i128::from(n))
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| Value::Timestamp(t.fixed_offset()))
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidTimestamp(format!("{n} seconds is out of range")),
                head_offset,
            )
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn epoch_from_float(v: Float, head_offset: usize) -> Result<Value> {
    let v = f64::from(v);
    let out_of_range = || {
        Error::new(
            ErrorKind::InvalidTimestamp(format!("{v} seconds is out of range")),
            head_offset,
        )
    };

    if !v.is_finite() {
        return Err(out_of_range());
    }
    let secs = v.floor();
    if secs < i64::MIN as f64 || secs >= i64::MAX as f64 {
        return Err(out_of_range());
    }

    let mut secs = secs as i64;
    let mut nanos = ((v - v.floor()) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }

    DateTime::from_timestamp(secs, nanos)
        .map(|t| Value::Timestamp(t.fixed_offset()))
        .ok_or_else(out_of_range)
}
