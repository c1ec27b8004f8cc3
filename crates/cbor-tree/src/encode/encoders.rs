use std::io;

use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat};
use num_bigint::{BigInt, Sign};
use num_traits::One;

use crate::{
    encode::{EncodeOptions, TimeRepresentation},
    error::{Error, ErrorKind, Result},
    float::{self, EncodedFloat},
    head::{Head, ARG_U16, ARG_U32, ARG_U64},
    simple::Simple,
    tag,
    value::{BigNum, Int},
    Value, IB_ARRAY_MIN, IB_BREAK, IB_BYTE_STR_MIN, IB_FP_SIMPLE_MIN, IB_MAP_MIN, IB_NEG_INT_MIN,
    IB_TAG_MIN, IB_TEXT_STR_MIN, IB_UINT_MIN,
};

/// An indefinite length item which has been started but not ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenItem {
    Array,
    Map {
        /// Number of keys and values written so far
        items: usize,
    },
    ByteStr,
    TextStr,
}

/// An encoder for [`Value`]s which writes to an [`io::Write`] target.
///
/// Besides encoding whole values, the encoder can write indefinite length
/// items piece by piece:
///
/// ```
/// use cbor_tree::{Encoder, Value};
///
/// let mut enc = Encoder::new(Vec::new());
/// enc.begin_indefinite_array()?;
/// enc.encode(&Value::from(1))?;
/// enc.begin_indefinite_text_str()?;
/// enc.encode(&Value::from("ab"))?;
/// enc.encode(&Value::from("c"))?;
/// enc.end()?;
/// enc.end()?;
/// assert_eq!(enc.finish()?, [0x9f, 0x01, 0x7f, 0x62, 0x61, 0x62, 0x61, 0x63, 0xff, 0xff]);
/// # Ok::<(), cbor_tree::Error>(())
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    options: EncodeOptions,
    /// Number of bytes written
    byte_offset: usize,
    open: Vec<OpenItem>,
}

impl<W> Encoder<W>
where
    W: io::Write,
{
    /// Constructs an `Encoder` with the default options.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, EncodeOptions::default())
    }

    /// Constructs an `Encoder` with the options.
    pub fn with_options(writer: W, options: EncodeOptions) -> Self {
        Encoder {
            writer,
            options,
            byte_offset: 0,
            open: Vec::new(),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    #[must_use]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Checks that every indefinite length item was ended and returns the
    /// inner writer.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::UnclosedIndefinite`] if an indefinite length
    /// item is still open.
    pub fn finish(self) -> Result<W> {
        if !self.open.is_empty() {
            return Err(Error::new(
                ErrorKind::UnclosedIndefinite {
                    open: self.open.len(),
                },
                self.byte_offset,
            ));
        }
        Ok(self.writer)
    }

    /// Encodes a value.
    ///
    /// Inside an indefinite length array or map, the value is the next
    /// element, key, or value. Inside an indefinite length string, the value
    /// is the next chunk and must be a string of the same kind.
    ///
    /// # Errors
    ///
    /// Fails if the value is nested too deeply, cannot be represented, or
    /// the writer fails.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        let invalid_chunk = match self.open.last_mut() {
            Some(OpenItem::ByteStr) if !matches!(value, Value::ByteStr(_)) => {
                Some("indefinite length byte string chunk is not a byte string")
            }
            Some(OpenItem::TextStr) if !matches!(value, Value::TextStr(_)) => {
                Some("indefinite length text string chunk is not a text string")
            }
            Some(OpenItem::Map { items }) => {
                *items += 1;
                None
            }
            _ => None,
        };
        if let Some(reason) = invalid_chunk {
            return Err(self.unsupported(reason));
        }

        self.encode_value(value, self.open.len())
    }

    /// Starts an indefinite length array.
    ///
    /// # Errors
    ///
    /// Fails if the array is nested too deeply or the writer fails.
    pub fn begin_indefinite_array(&mut self) -> Result<()> {
        self.begin(IB_ARRAY_MIN, OpenItem::Array)
    }

    /// Starts an indefinite length map. Keys and values are written in turn.
    ///
    /// # Errors
    ///
    /// Fails if the map is nested too deeply or the writer fails.
    pub fn begin_indefinite_map(&mut self) -> Result<()> {
        self.begin(IB_MAP_MIN, OpenItem::Map { items: 0 })
    }

    /// Starts an indefinite length byte string. Chunks are written with
    /// [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Fails if the string is nested too deeply or the writer fails.
    pub fn begin_indefinite_byte_str(&mut self) -> Result<()> {
        self.begin(IB_BYTE_STR_MIN, OpenItem::ByteStr)
    }

    /// Starts an indefinite length text string. Chunks are written with
    /// [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Fails if the string is nested too deeply or the writer fails.
    pub fn begin_indefinite_text_str(&mut self) -> Result<()> {
        self.begin(IB_TEXT_STR_MIN, OpenItem::TextStr)
    }

    /// Ends the innermost indefinite length item with a break marker.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::UnbalancedBreak`] if no indefinite length item
    /// is open, or with [`ErrorKind::MalformedIndefiniteMap`] if a map has a
    /// key without a value.
    pub fn end(&mut self) -> Result<()> {
        match self.open.last() {
            None => {
                return Err(Error::new(ErrorKind::UnbalancedBreak, self.byte_offset));
            }
            Some(OpenItem::Map { items }) if items % 2 != 0 => {
                return Err(Error::new(
                    ErrorKind::MalformedIndefiniteMap,
                    self.byte_offset,
                ));
            }
            Some(_) => {}
        }

        self.write_all(&[IB_BREAK])?;
        self.open.pop();
        Ok(())
    }

    fn begin(&mut self, ib: u8, item: OpenItem) -> Result<()> {
        match self.open.last_mut() {
            Some(OpenItem::ByteStr | OpenItem::TextStr) => {
                return Err(Error::new(
                    ErrorKind::UnsupportedValue("indefinite length strings cannot be nested"),
                    self.byte_offset,
                ));
            }
            Some(OpenItem::Map { items }) => *items += 1,
            _ => {}
        }
        self.enter(self.open.len())?;

        self.write_all(Head::indefinite(ib).as_slice())?;
        self.open.push(item);
        Ok(())
    }

    fn encode_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Int(Int::Pos(v)) => self.write_head(IB_UINT_MIN, *v),
            Value::Int(Int::Neg(n)) => self.write_head(IB_NEG_INT_MIN, *n),
            Value::BigInt(n) => self.encode_bigint(n),
            Value::ByteStr(b) => {
                self.write_head(IB_BYTE_STR_MIN, b.len() as u64)?;
                self.write_all(b)
            }
            Value::TextStr(s) => self.write_text(s),
            Value::Array(arr) => {
                let depth = self.enter(depth)?;
                self.write_head(IB_ARRAY_MIN, arr.len() as u64)?;
                for elem in arr {
                    self.encode_value(elem, depth)?;
                }
                Ok(())
            }
            Value::Map(map) => {
                let depth = self.enter(depth)?;
                self.write_head(IB_MAP_MIN, map.len() as u64)?;
                for (k, v) in map {
                    self.encode_value(k, depth)?;
                    self.encode_value(v, depth)?;
                }
                Ok(())
            }
            Value::Float(v) => self.encode_f64(f64::from(*v)),
            Value::Bool(v) => self.write_simple(Simple::from_bool(*v)),
            Value::Null => self.write_simple(Simple::Null),
            Value::Undefined => self.write_simple(Simple::Undefined),
            Value::Timestamp(t) => self.encode_timestamp(t),
            Value::Uri(u) => {
                self.write_head(IB_TAG_MIN, tag::TAG_URI)?;
                self.write_text(u.as_str())
            }
        }
    }

    /// Writes an integer outside of the 64-bit lanes as a bignum.
    fn encode_bigint(&mut self, n: &BigNum) -> Result<()> {
        let n = n.as_bigint();
        let (tag_num, magnitude) = if n.sign() == Sign::Minus {
            (tag::TAG_NEG_BIGNUM, -n - BigInt::one())
        } else {
            (tag::TAG_BIGNUM, n.clone())
        };
        let bytes = magnitude.magnitude().to_bytes_be();

        self.write_head(IB_TAG_MIN, tag_num)?;
        self.write_head(IB_BYTE_STR_MIN, bytes.len() as u64)?;
        self.write_all(&bytes)
    }

    fn encode_f64(&mut self, v: f64) -> Result<()> {
        match float::encode_f64(v, self.options.float_width) {
            EncodedFloat::Half(bits) => {
                self.write_all(&[IB_FP_SIMPLE_MIN | ARG_U16])?;
                self.write_all(&bits.to_be_bytes())
            }
            EncodedFloat::Single(bits) => {
                self.write_all(&[IB_FP_SIMPLE_MIN | ARG_U32])?;
                self.write_all(&bits.to_be_bytes())
            }
            EncodedFloat::Double(bits) => {
                self.write_all(&[IB_FP_SIMPLE_MIN | ARG_U64])?;
                self.write_all(&bits.to_be_bytes())
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn encode_timestamp(&mut self, t: &DateTime<FixedOffset>) -> Result<()> {
        match self.options.time_representation {
            TimeRepresentation::Text => {
                // RFC 3339 offsets have whole minutes.
                let t = if t.offset().local_minus_utc() % 60 == 0 {
                    *t
                } else {
                    t.to_utc().fixed_offset()
                };
                if !(0..=9999).contains(&t.year()) {
                    return Err(self.unsupported("text timestamp year is not 0000 to 9999"));
                }
                let s = t.to_rfc3339_opts(SecondsFormat::AutoSi, true);
                self.write_head(IB_TAG_MIN, tag::TAG_DATETIME_STR)?;
                self.write_text(&s)
            }
            TimeRepresentation::IntegerSeconds => {
                self.write_head(IB_TAG_MIN, tag::TAG_EPOCH_TIME)?;
                self.encode_value(&Value::from(t.timestamp()), 0)
            }
            TimeRepresentation::FloatSeconds => {
                let secs =
                    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1_000_000_000.0;
                self.write_head(IB_TAG_MIN, tag::TAG_EPOCH_TIME)?;
                self.encode_f64(secs)
            }
        }
    }

    fn write_text(&mut self, s: &str) -> Result<()> {
        self.write_head(IB_TEXT_STR_MIN, s.len() as u64)?;
        self.write_all(s.as_bytes())
    }

    fn write_simple(&mut self, simple: Simple) -> Result<()> {
        log::trace!("{simple} at byte offset {}", self.byte_offset);
        self.write_all(&[IB_FP_SIMPLE_MIN | simple.code()])
    }

    fn write_head(&mut self, ib: u8, value: u64) -> Result<()> {
        let head = Head::new(ib, value);
        log::trace!(
            "head {:#04x} with argument {value} at byte offset {}",
            head.as_slice()[0],
            self.byte_offset
        );
        self.write_all(head.as_slice())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| Error::new(ErrorKind::Io(e), self.byte_offset))?;
        self.byte_offset += bytes.len();
        Ok(())
    }

    /// Returns the depth of the children of a new array or map at `depth`.
    fn enter(&self, depth: usize) -> Result<usize> {
        if depth >= self.options.max_depth {
            return Err(Error::new(
                ErrorKind::NestingTooDeep {
                    max_depth: self.options.max_depth,
                },
                self.byte_offset,
            ));
        }
        Ok(depth + 1)
    }

    fn unsupported(&self, reason: &'static str) -> Error {
        Error::new(ErrorKind::UnsupportedValue(reason), self.byte_offset)
    }
}
