//! Represents decoded data as a tree.

use core::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use ordered_float::OrderedFloat;
use url::Url;

use crate::ByteString;

mod index;

pub use index::Index;

/// Integer value which fits in the 64-bit integer lanes.
///
/// The negative lane stores `n` for the value `-1 - n`, so every integer from
/// `-2^64` to `2^64 - 1` is representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Int {
    /// Non-negative value
    Pos(u64),
    /// Negative value `-1 - n`
    Neg(u64),
}

impl Int {
    /// Returns true if the value is less than zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Int::Neg(_))
    }

    /// Returns `None` when the value does not fit in the 64-bit lanes.
    pub(crate) fn from_bigint(v: &BigInt) -> Option<Self> {
        if let Some(v) = v.to_u64() {
            return Some(Int::Pos(v));
        }
        let n = -v - BigInt::one();
        n.to_u64().map(Int::Neg)
    }
}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        i128::from(*self).cmp(&i128::from(*other))
    }
}

impl Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&i128::from(*self), f)
    }
}

impl From<Int> for i128 {
    fn from(value: Int) -> Self {
        match value {
            Int::Pos(v) => i128::from(v),
            Int::Neg(n) => -1 - i128::from(n),
        }
    }
}

impl From<Int> for BigInt {
    fn from(value: Int) -> Self {
        BigInt::from(i128::from(value))
    }
}

impl TryFrom<i128> for Int {
    type Error = core::num::TryFromIntError;

    fn try_from(v: i128) -> Result<Self, Self::Error> {
        if v < 0 {
            u64::try_from(v.unsigned_abs() - 1).map(Int::Neg)
        } else {
            u64::try_from(v).map(Int::Pos)
        }
    }
}

impl TryFrom<u128> for Int {
    type Error = core::num::TryFromIntError;

    fn try_from(v: u128) -> Result<Self, Self::Error> {
        u64::try_from(v).map(Int::Pos)
    }
}

/// Integer outside of the 64-bit integer lanes.
///
/// The only way to build one is from a [`BigInt`] which does not fit in an
/// [`Int`], so every integer has exactly one representation in a [`Value`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigNum(BigInt);

impl BigNum {
    /// Returns a reference to the integer.
    #[must_use]
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Returns the integer.
    #[must_use]
    pub fn into_bigint(self) -> BigInt {
        self.0
    }
}

/// Fails with the [`Int`] when the integer fits in the 64-bit lanes.
impl TryFrom<BigInt> for BigNum {
    type Error = Int;

    fn try_from(v: BigInt) -> Result<Self, Self::Error> {
        match Int::from_bigint(&v) {
            Some(n) => Err(n),
            None => Ok(BigNum(v)),
        }
    }
}

impl From<BigNum> for BigInt {
    fn from(value: BigNum) -> Self {
        value.0
    }
}

impl Display for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Int {
                #[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
                fn from(v: $ty) -> Self {
                    Int::Pos(v as u64)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(Int::from(v))
                }
            }
        )*
    };
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Int {
                #[allow(
                    clippy::cast_lossless,
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss
                )]
                fn from(v: $ty) -> Self {
                    if v < 0 {
                        Int::Neg(v.unsigned_abs() as u64 - 1)
                    } else {
                        Int::Pos(v as u64)
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(Int::from(v))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, usize);
impl_from_signed!(i8, i16, i32, i64, isize);

/// Newtype struct for a float
///
/// `OrderedFloat` is used internally so that NaN is equal to itself and floats
/// can be map keys. `-0.0` and `0.0` are distinct, with `-0.0` ordered first.
#[derive(Debug, Clone, Copy)]
pub struct Float(OrderedFloat<f64>);

impl Float {
    fn key(self) -> (OrderedFloat<f64>, bool) {
        let neg_zero = self.0.into_inner().to_bits() == (-0.0_f64).to_bits();
        (self.0, !neg_zero)
    }
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Float {}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0.into_inner();
        if v.is_nan() {
            f.write_str("NaN")
        } else if v.is_infinite() {
            f.write_str(if v.is_sign_negative() {
                "-Infinity"
            } else {
                "Infinity"
            })
        } else {
            fmt::Debug::fmt(&v, f)
        }
    }
}

impl From<f32> for Float {
    fn from(v: f32) -> Self {
        Float(OrderedFloat(f64::from(v)))
    }
}

impl From<f64> for Float {
    fn from(v: f64) -> Self {
        Float(OrderedFloat(v))
    }
}

impl From<Float> for f64 {
    fn from(value: Float) -> Self {
        value.0.into_inner()
    }
}

/// Represents a decoded item.
///
/// It is useful when the structure of data is unknown. Tags with a known
/// meaning are resolved into [`Value::BigInt`], [`Value::Timestamp`], and
/// [`Value::Uri`]; other tags are not kept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Integer from `-2^64` to `2^64 - 1`
    Int(Int),
    /// Integer outside of the range of [`Value::Int`]
    BigInt(BigNum),
    /// A byte string
    ByteStr(ByteString),
    /// A UTF-8 string
    TextStr(String),
    /// Array of values
    Array(Vec<Value>),
    /// Map of values
    ///
    /// Any value may be a key. Duplicate keys keep the last value.
    Map(BTreeMap<Value, Value>),
    /// Float value
    Float(Float),
    /// Boolean
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// Date and time with an offset
    Timestamp(DateTime<FixedOffset>),
    /// Absolute URI
    Uri(Url),
}

impl Value {
    /// If the value is an integer, returns a reference to the underlying value.
    #[must_use]
    pub fn as_int(&self) -> Option<&Int> {
        match self {
            Value::Int(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is an integer which fits in a [u64], returns the value.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(Int::Pos(n)) => Some(*n),
            _ => None,
        }
    }

    /// If the value is an integer which fits in an [i64], returns the value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => i64::try_from(i128::from(*n)).ok(),
            _ => None,
        }
    }

    /// If the value is an integer of any size, returns it as a [BigInt].
    #[must_use]
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Int(n) => Some(BigInt::from(*n)),
            Value::BigInt(n) => Some(n.as_bigint().clone()),
            _ => None,
        }
    }

    /// If the value is a byte string, returns a reference to the underlying value.
    #[must_use]
    pub fn as_byte_str(&self) -> Option<&ByteString> {
        match self {
            Value::ByteStr(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a byte string, returns a mutable reference to the underlying value.
    #[must_use]
    pub fn as_byte_str_mut(&mut self) -> Option<&mut ByteString> {
        match self {
            Value::ByteStr(ref mut b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a text string, returns a reference to the underlying value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::TextStr(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a text string, returns a mutable reference to the underlying value.
    #[must_use]
    pub fn as_string_mut(&mut self) -> Option<&mut String> {
        match self {
            Value::TextStr(ref mut s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to the underlying value.
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(ref l) => Some(l),
            _ => None,
        }
    }

    /// If the value is an array, returns a mutable reference to the underlying value.
    #[must_use]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(ref mut l) => Some(l),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to the underlying value.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(d) => Some(d),
            _ => None,
        }
    }

    /// If the value is a map, returns a mutable reference to the underlying value.
    #[must_use]
    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<Value, Value>> {
        match self {
            Value::Map(ref mut d) => Some(d),
            _ => None,
        }
    }

    /// If the value is a float, returns the underlying value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// If the value is a boolean, returns the underlying value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// If the value is a timestamp, returns a reference to the underlying value.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// If the value is a URI, returns a reference to the underlying value.
    #[must_use]
    pub fn as_uri(&self) -> Option<&Url> {
        match self {
            Value::Uri(u) => Some(u),
            _ => None,
        }
    }

    /// Returns true if the value is an integer of any size.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    /// Returns true if the value is a byte string.
    #[must_use]
    pub fn is_byte_str(&self) -> bool {
        self.as_byte_str().is_some()
    }

    /// Returns true if the value is a text string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.as_str().is_some()
    }

    /// Returns true if the value is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.as_array().is_some()
    }

    /// Returns true if the value is a map.
    #[must_use]
    pub fn is_map(&self) -> bool {
        self.as_map().is_some()
    }

    /// Returns true if the value is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is `undefined`.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Used to get a reference to a value with an index.
    #[inline]
    pub fn get<I: Index>(&self, index: I) -> Option<&Value> {
        index.index(self)
    }

    /// Used to get a mutable reference to a value with an index.
    #[inline]
    pub fn get_mut<I: Index>(&mut self, index: I) -> Option<&mut Value> {
        index.index_mut(self)
    }
}

/// Writes the value in diagnostic notation.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => Display::fmt(n, f),
            Value::BigInt(n) => Display::fmt(n, f),
            Value::ByteStr(b) => fmt::Debug::fmt(b, f),
            Value::TextStr(s) => fmt::Debug::fmt(s.as_str(), f),
            Value::Array(arr) => {
                f.write_str("[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(v, f)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Float(v) => Display::fmt(v, f),
            Value::Bool(v) => Display::fmt(v, f),
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            Value::Timestamp(t) => {
                write!(f, "0({:?})", t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Uri(u) => write!(f, "32({:?})", u.as_str()),
        }
    }
}

impl From<u128> for Value {
    fn from(v: u128) -> Self {
        Value::from(BigInt::from(v))
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::from(BigInt::from(v))
    }
}

impl From<Int> for Value {
    fn from(v: Int) -> Self {
        Value::Int(v)
    }
}

/// Integers which fit in [`Value::Int`] are normalized into it.
impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        match BigNum::try_from(v) {
            Ok(n) => Value::BigInt(n),
            Err(n) => Value::Int(n),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(Float::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(Float::from(v))
    }
}

impl From<Float> for Value {
    fn from(v: Float) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(other: &'a str) -> Value {
        Value::TextStr(String::from(other))
    }
}

impl From<String> for Value {
    fn from(other: String) -> Value {
        Value::TextStr(other)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(other: &'a [u8]) -> Value {
        Value::ByteStr(ByteString::from(other))
    }
}

impl From<Vec<u8>> for Value {
    fn from(other: Vec<u8>) -> Value {
        Value::ByteStr(ByteString::from(other))
    }
}

impl From<ByteString> for Value {
    fn from(other: ByteString) -> Value {
        Value::ByteStr(other)
    }
}

impl From<Vec<Value>> for Value {
    fn from(other: Vec<Value>) -> Value {
        Value::Array(other)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(other: BTreeMap<K, V>) -> Value {
        Value::Map(
            other
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(other: DateTime<Tz>) -> Value {
        Value::Timestamp(other.fixed_offset())
    }
}

impl From<Url> for Value {
    fn from(other: Url) -> Value {
        Value::Uri(other)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(other: Option<T>) -> Value {
        other.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(Value, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}
