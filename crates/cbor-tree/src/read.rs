//! Cursor over a fully buffered input for the decoder.

use crate::error::{Error, ErrorKind, Result};

/// A read position over a byte slice.
///
/// Every read either returns exactly the requested bytes and advances the
/// position, or fails with [`ErrorKind::TruncatedInput`] and leaves the
/// position unchanged. Returned slices borrow from the input; nothing is
/// copied.
#[derive(Debug, Clone)]
pub(crate) struct SliceRead<'a> {
    slice: &'a [u8],
    byte_offset: usize,
}

impl<'a> SliceRead<'a> {
    /// Instantiates a new reader.
    #[must_use]
    pub(crate) fn new(slice: &'a [u8]) -> Self {
        SliceRead {
            slice,
            byte_offset: 0,
        }
    }

    /// Consumes and returns the next byte.
    #[inline]
    pub(crate) fn next(&mut self) -> Result<u8> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Consumes and returns exactly the next `n` bytes.
    #[inline]
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(Error::new(
                ErrorKind::TruncatedInput {
                    needed: n,
                    remaining,
                },
                self.byte_offset,
            ));
        }

        let start = self.byte_offset;
        self.byte_offset += n;
        Ok(&self.slice[start..self.byte_offset])
    }

    /// Consumes exactly `N` bytes into an array.
    #[inline]
    pub(crate) fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Number of bytes which have not been consumed.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.slice.len() - self.byte_offset
    }

    /// Returns true if every byte has been consumed.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the position in the input.
    #[inline]
    pub(crate) fn byte_offset(&self) -> usize {
        self.byte_offset
    }
}

/// Folds big-endian bytes into an unsigned integer.
///
/// Only the widths used by item heads (1, 2, 4, and 8 bytes) are passed in;
/// longer inputs keep the low 64 bits.
#[must_use]
pub(crate) fn uint_from_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0, |acc, b| (acc << 8) | u64::from(*b))
}
