//! Decoder for binary data into a [`Value`] tree.
//!
//! The input is a fully buffered byte slice. Decoding is a recursive descent
//! over item heads: each head selects a major type and an argument, and
//! arrays, maps, and tags recurse into the following items.
//!
//! ```
//! use cbor_tree::{decode, Value};
//!
//! let value = decode(&[0x83, 0x01, 0x02, 0x03])?;
//! assert_eq!(value, Value::from(vec![Value::from(1), Value::from(2), Value::from(3)]));
//! # Ok::<(), cbor_tree::Error>(())
//! ```
//!
//! Malformed input fails with an [`Error`][crate::Error] which carries the
//! byte offset where the problem was detected. The decoder never attempts to
//! resynchronize after an error.

use std::collections::BTreeMap;

use crate::{
    error::{Error, ErrorKind, Result},
    float,
    head::{self, Argument},
    read::SliceRead,
    simple::Simple,
    tag::{self, TagPolicy},
    value::Int,
    ByteString, Value, IB_ARRAY_MIN, IB_BREAK, IB_BYTE_STR_MIN, IB_FP_SIMPLE_MIN, IB_MAP_MIN,
    IB_NEG_INT_MIN, IB_TAG_MIN, IB_TEXT_STR_MIN, IB_UINT_MIN,
};

mod indefinite;

/// Default maximum nesting depth of arrays, maps, and indefinite length
/// strings.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
    /// Maximum nesting depth of arrays, maps, and indefinite length strings.
    ///
    /// A top level array is at depth 1. Deeper input fails with
    /// [`ErrorKind::NestingTooDeep`].
    pub max_depth: usize,
    /// Treatment of tags which are not interpreted.
    pub unknown_tags: TagPolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unknown_tags: TagPolicy::default(),
        }
    }
}

impl DecodeOptions {
    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the treatment of tags which are not interpreted.
    #[must_use]
    pub const fn with_unknown_tags(mut self, unknown_tags: TagPolicy) -> Self {
        self.unknown_tags = unknown_tags;
        self
    }
}

/// The result of parsing one item head and everything it contains.
#[derive(Debug)]
pub(crate) enum Step {
    /// A complete item
    Value(Value),
    /// A break marker, which closes the innermost indefinite length item
    Break,
}

/// A tag which applies to the next item.
#[derive(Debug, Clone, Copy)]
struct PendingTag {
    num: tag::Num,
    head_offset: usize,
}

pub(crate) struct DecoderImpl<'a> {
    read: SliceRead<'a>,
    options: DecodeOptions,
    /// Number of open arrays, maps, and indefinite length strings
    depth: usize,
}

impl<'a> DecoderImpl<'a> {
    /// Constructs a decoder over the input.
    pub(crate) fn new(input: &'a [u8], options: DecodeOptions) -> Self {
        DecoderImpl {
            read: SliceRead::new(input),
            options,
            depth: 0,
        }
    }

    /// Decodes one item where a break marker is not allowed.
    pub(crate) fn parse_value(&mut self) -> Result<Value> {
        match self.parse_one()? {
            Step::Value(value) => Ok(value),
            Step::Break => Err(Error::new(
                ErrorKind::UnbalancedBreak,
                self.read.byte_offset() - 1,
            )),
        }
    }

    /// Decodes one item, or consumes one break marker.
    ///
    /// A run of tags is consumed in a loop. Only the last tag before the item
    /// is applied.
    pub(crate) fn parse_one(&mut self) -> Result<Step> {
        let mut pending: Option<PendingTag> = None;

        loop {
            let head_offset = self.read.byte_offset();
            let init_byte = self.read.next()?;
            log::trace!("head {init_byte:#04x} at byte offset {head_offset}");

            match init_byte {
                IB_TAG_MIN..IB_FP_SIMPLE_MIN => {
                    let num = self.read_definite_argument(init_byte, head_offset)?;
                    if let Some(prev) = pending {
                        log::debug!("tag {} replaced by tag {num}", prev.num);
                    }
                    pending = Some(PendingTag { num, head_offset });
                }
                IB_BREAK => {
                    return match pending {
                        Some(tag) => Err(Error::new(
                            ErrorKind::DanglingTag { tag: tag.num },
                            head_offset,
                        )),
                        None => Ok(Step::Break),
                    };
                }
                _ => {
                    let value = self.parse_item(init_byte, head_offset)?;
                    let value = match pending {
                        Some(tag) => {
                            tag::apply(tag.num, value, self.options.unknown_tags, tag.head_offset)?
                        }
                        None => value,
                    };
                    return Ok(Step::Value(value));
                }
            }
        }
    }

    /// Decodes the item which starts with `init_byte`, which is neither a tag
    /// nor a break marker.
    fn parse_item(&mut self, init_byte: u8, head_offset: usize) -> Result<Value> {
        match init_byte {
            IB_UINT_MIN..IB_NEG_INT_MIN => {
                let v = self.read_definite_argument(init_byte, head_offset)?;
                Ok(Value::Int(Int::Pos(v)))
            }
            IB_NEG_INT_MIN..IB_BYTE_STR_MIN => {
                let n = self.read_definite_argument(init_byte, head_offset)?;
                Ok(Value::Int(Int::Neg(n)))
            }
            IB_BYTE_STR_MIN..IB_TEXT_STR_MIN => {
                match head::read_argument(&mut self.read, init_byte, head_offset)? {
                    Argument::Value(len) => {
                        let bytes = self.take_len(len)?;
                        Ok(Value::ByteStr(ByteString::from(bytes)))
                    }
                    Argument::Indefinite => self.parse_indefinite_byte_str(head_offset),
                }
            }
            IB_TEXT_STR_MIN..IB_ARRAY_MIN => {
                match head::read_argument(&mut self.read, init_byte, head_offset)? {
                    Argument::Value(len) => {
                        let bytes = self.take_len(len)?;
                        let s = core::str::from_utf8(bytes)
                            .map_err(|e| Error::new(ErrorKind::InvalidUtf8(e), head_offset))?;
                        Ok(Value::TextStr(String::from(s)))
                    }
                    Argument::Indefinite => self.parse_indefinite_text_str(head_offset),
                }
            }
            IB_ARRAY_MIN..IB_MAP_MIN => {
                match head::read_argument(&mut self.read, init_byte, head_offset)? {
                    Argument::Value(len) => self.parse_array(len, head_offset),
                    Argument::Indefinite => self.parse_indefinite_array(head_offset),
                }
            }
            IB_MAP_MIN..IB_TAG_MIN => {
                match head::read_argument(&mut self.read, init_byte, head_offset)? {
                    Argument::Value(len) => self.parse_map(len, head_offset),
                    Argument::Indefinite => self.parse_indefinite_map(head_offset),
                }
            }
            _ => self.parse_fp_simple(init_byte, head_offset),
        }
    }

    fn parse_array(&mut self, len: u64, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        // Every element is at least one byte long.
        let capacity = usize::try_from(len).map_or(0, |len| len.min(self.read.remaining()));
        let mut arr = Vec::with_capacity(capacity);
        for _ in 0..len {
            arr.push(self.parse_value()?);
        }

        self.leave();
        Ok(Value::Array(arr))
    }

    fn parse_map(&mut self, len: u64, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = self.parse_value()?;
            let value = self.parse_value()?;
            map.insert(key, value);
        }

        self.leave();
        Ok(Value::Map(map))
    }

    fn parse_fp_simple(&mut self, init_byte: u8, head_offset: usize) -> Result<Value> {
        let arg_val = init_byte & head::ARG_MASK;
        match arg_val {
            0..=head::ARG_INLINE_MAX => simple_value(arg_val, head_offset),
            head::ARG_U8 => {
                let v = self.read.next()?;
                simple_value(v, head_offset)
            }
            head::ARG_U16 => {
                let bits = u16::from_be_bytes(self.read.take_array()?);
                Ok(Value::from(float::f64_from_half_bits(bits)))
            }
            head::ARG_U32 => Ok(Value::from(float::f64_from_single_bytes(
                self.read.take_array()?,
            ))),
            head::ARG_U64 => Ok(Value::from(float::f64_from_double_bytes(
                self.read.take_array()?,
            ))),
            _ => Err(Error::new(
                ErrorKind::InvalidSubtype {
                    major_type: head::major_type(init_byte),
                    subtype: arg_val,
                },
                head_offset,
            )),
        }
    }

    /// Reads an argument where the indefinite length marker is not allowed.
    fn read_definite_argument(&mut self, init_byte: u8, head_offset: usize) -> Result<u64> {
        match head::read_argument(&mut self.read, init_byte, head_offset)? {
            Argument::Value(v) => Ok(v),
            Argument::Indefinite => Err(Error::new(
                ErrorKind::InvalidSubtype {
                    major_type: head::major_type(init_byte),
                    subtype: head::ARG_INDEFINITE,
                },
                head_offset,
            )),
        }
    }

    /// Consumes a string payload of a declared length.
    fn take_len(&mut self, len: u64) -> Result<&'a [u8]> {
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read.take(len)
    }

    /// Opens a nested array, map, or indefinite length string.
    fn enter(&mut self, head_offset: usize) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::new(
                ErrorKind::NestingTooDeep {
                    max_depth: self.options.max_depth,
                },
                head_offset,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
    }

    /// Number of bytes consumed so far.
    pub(crate) fn byte_offset(&self) -> usize {
        self.read.byte_offset()
    }

    /// Returns true if the whole input has been consumed.
    pub(crate) fn is_empty(&self) -> bool {
        self.read.is_empty()
    }
}

fn simple_value(v: u8, head_offset: usize) -> Result<Value> {
    let simple = Simple::try_from(v)
        .map_err(|v| Error::new(ErrorKind::InvalidSimpleValue(v), head_offset))?;
    Ok(match simple {
        Simple::False => Value::Bool(false),
        Simple::True => Value::Bool(true),
        Simple::Null => Value::Null,
        Simple::Undefined => Value::Undefined,
    })
}

/// Decodes every item in `input` and returns the last one.
///
/// Earlier top level items are discarded. Use [`decode_one`] or
/// [`decode_all`] to keep them.
///
/// # Errors
///
/// Fails if the input is empty or malformed.
pub fn decode(input: &[u8]) -> Result<Value> {
    decode_with_options(input, &DecodeOptions::default())
}

/// Decodes every item in `input` with the options and returns the last one.
///
/// # Errors
///
/// Fails if the input is empty or malformed.
pub fn decode_with_options(input: &[u8], options: &DecodeOptions) -> Result<Value> {
    let mut de = DecoderImpl::new(input, *options);

    let mut last = de.parse_value()?;
    while !de.is_empty() {
        let value = de.parse_value()?;
        log::debug!("discarding top level value {last}");
        last = value;
    }

    Ok(last)
}

/// Decodes the first item in `input`.
///
/// Returns the item and the number of bytes it occupies. Any bytes after the
/// item are not read.
///
/// ```
/// use cbor_tree::{decode_one, DecodeOptions, Value};
///
/// let input = [0x01, 0x62, 0x68, 0x69];
/// let (first, len) = decode_one(&input, &DecodeOptions::default())?;
/// assert_eq!(first, Value::from(1));
/// let (second, _) = decode_one(&input[len..], &DecodeOptions::default())?;
/// assert_eq!(second, Value::from("hi"));
/// # Ok::<(), cbor_tree::Error>(())
/// ```
///
/// # Errors
///
/// Fails if the input is empty or the first item is malformed.
pub fn decode_one(input: &[u8], options: &DecodeOptions) -> Result<(Value, usize)> {
    let mut de = DecoderImpl::new(input, *options);
    let value = de.parse_value()?;
    Ok((value, de.byte_offset()))
}

/// Decodes every item in `input` in order.
///
/// An empty input decodes to an empty vector.
///
/// # Errors
///
/// Fails if any item is malformed.
pub fn decode_all(input: &[u8], options: &DecodeOptions) -> Result<Vec<Value>> {
    let mut de = DecoderImpl::new(input, *options);

    let mut values = Vec::new();
    while !de.is_empty() {
        values.push(de.parse_value()?);
    }
    Ok(values)
}
