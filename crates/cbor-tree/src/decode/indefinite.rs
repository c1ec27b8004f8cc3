//! Indefinite length items.
//!
//! An indefinite length item has no declared length. Its elements (or, for
//! strings, its chunks) follow until a break marker. A break only closes the
//! item which is currently being built: breaks of nested items are consumed by
//! the nested calls.

use std::collections::BTreeMap;

use super::{DecoderImpl, Step};
use crate::{
    error::{Error, ErrorKind, Result},
    head::{self, Argument},
    ByteString, Value, IB_BREAK, IB_BYTE_STR_MIN, IB_TEXT_STR_MIN,
};

impl<'a> DecoderImpl<'a> {
    pub(super) fn parse_indefinite_array(&mut self, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        let mut arr = Vec::new();
        while let Step::Value(value) = self.parse_one()? {
            arr.push(value);
        }

        self.leave();
        Ok(Value::Array(arr))
    }

    pub(super) fn parse_indefinite_map(&mut self, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        let mut map = BTreeMap::new();
        while let Step::Value(key) = self.parse_one()? {
            let value = match self.parse_one()? {
                Step::Value(value) => value,
                Step::Break => {
                    return Err(Error::new(
                        ErrorKind::MalformedIndefiniteMap,
                        self.byte_offset() - 1,
                    ))
                }
            };
            map.insert(key, value);
        }

        self.leave();
        Ok(Value::Map(map))
    }

    pub(super) fn parse_indefinite_byte_str(&mut self, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        let mut bytes = ByteString::default();
        while let Some((chunk, _)) = self.next_chunk(IB_BYTE_STR_MIN)? {
            bytes.extend_from_slice(chunk);
        }

        self.leave();
        Ok(Value::ByteStr(bytes))
    }

    pub(super) fn parse_indefinite_text_str(&mut self, head_offset: usize) -> Result<Value> {
        self.enter(head_offset)?;

        let mut s = String::new();
        while let Some((chunk, chunk_offset)) = self.next_chunk(IB_TEXT_STR_MIN)? {
            // Each chunk must be valid on its own; a code point cannot span chunks.
            let chunk = core::str::from_utf8(chunk)
                .map_err(|e| Error::new(ErrorKind::InvalidUtf8(e), chunk_offset))?;
            s.push_str(chunk);
        }

        self.leave();
        Ok(Value::TextStr(s))
    }

    /// Reads the next chunk of an indefinite length string with the initial
    /// byte base `ib`.
    ///
    /// Returns the chunk and the offset of its head, or `None` at the break
    /// marker.
    fn next_chunk(&mut self, ib: u8) -> Result<Option<(&'a [u8], usize)>> {
        let chunk_offset = self.read.byte_offset();
        let init_byte = self.read.next()?;
        log::trace!("chunk head {init_byte:#04x} at byte offset {chunk_offset}");

        if init_byte == IB_BREAK {
            return Ok(None);
        }

        let invalid_chunk = || {
            Error::new(
                ErrorKind::InvalidIndefiniteChunk {
                    major_type: head::major_type(init_byte),
                },
                chunk_offset,
            )
        };

        if init_byte & head::MAJOR_TYPE_MASK != ib {
            return Err(invalid_chunk());
        }
        match head::read_argument(&mut self.read, init_byte, chunk_offset)? {
            Argument::Value(len) => Ok(Some((self.take_len(len)?, chunk_offset))),
            Argument::Indefinite => Err(invalid_chunk()),
        }
    }
}
