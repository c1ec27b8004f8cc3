//! Possible crate errors.

use core::{
    error,
    fmt::{self, Display},
    result,
    str::Utf8Error,
};

/// Alias for a [`Result`][std::result::Result] with a [`cbor_tree::Error`][Error] error type.
pub type Result<T> = result::Result<T, Error>;

/// Errors during decoding and encoding.
pub struct Error {
    inner: Box<ErrorImpl>,
}

impl Error {
    /// Constructs an error with the kind and the byte offset where the error
    /// was detected.
    ///
    /// When decoding, the offset is the position in the input of the item
    /// head which could not be processed. When encoding, the offset is the
    /// number of bytes already written.
    #[must_use]
    #[inline]
    pub fn new(kind: ErrorKind, byte_offset: usize) -> Self {
        Self {
            inner: Box::new(ErrorImpl { kind, byte_offset }),
        }
    }

    /// The kind of error encountered
    #[must_use]
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    /// The byte offset where the error was detected.
    #[must_use]
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.inner.byte_offset
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.inner.kind.source()
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        if let ErrorKind::Io(error) = error.inner.kind {
            return error;
        }
        std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())
    }
}

struct ErrorImpl {
    kind: ErrorKind,
    byte_offset: usize,
}

impl Display for ErrorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte offset {}", self.kind, self.byte_offset)
    }
}

impl fmt::Debug for ErrorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("byte_offset", &self.byte_offset)
            .finish()
    }
}

/// All possible crate errors.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input ended before an item was complete.
    TruncatedInput {
        /// Number of bytes the decoder tried to read.
        needed: usize,
        /// Number of bytes left in the input.
        remaining: usize,
    },
    /// The 5-bit argument of an initial byte has no meaning for its major type.
    InvalidSubtype {
        /// Major type of the initial byte (0 to 7).
        major_type: u8,
        /// The 5-bit argument.
        subtype: u8,
    },
    /// A simple value other than `false`, `true`, `null`, or `undefined`.
    InvalidSimpleValue(u8),
    /// A break marker was found outside of an indefinite length item.
    UnbalancedBreak,
    /// An indefinite length map ended after a key without its value.
    MalformedIndefiniteMap,
    /// A tag was applied to an item it cannot describe.
    ///
    /// Only returned when the decoder is configured with
    /// [`TagPolicy::Reject`][crate::TagPolicy::Reject].
    UnsupportedTag {
        /// The tag number.
        tag: u64,
    },
    /// The value cannot be represented in the encoded form.
    UnsupportedValue(&'static str),
    /// Arrays, maps, or indefinite length strings were nested too deeply.
    NestingTooDeep {
        /// The configured maximum depth.
        max_depth: usize,
    },
    /// A text string was not valid UTF-8.
    InvalidUtf8(Utf8Error),
    /// A chunk of an indefinite length string was not a definite length
    /// string of the same major type.
    InvalidIndefiniteChunk {
        /// Major type of the offending chunk.
        major_type: u8,
    },
    /// A tag was directly followed by a break marker.
    DanglingTag {
        /// The tag number.
        tag: u64,
    },
    /// A tagged date/time could not be interpreted.
    InvalidTimestamp(String),
    /// A tagged URI could not be parsed.
    InvalidUri(url::ParseError),
    /// The encoder was finished while indefinite length items were still open.
    UnclosedIndefinite {
        /// Number of items which were not closed.
        open: usize,
    },
    /// An I/O error from the underlying writer.
    Io(std::io::Error),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TruncatedInput { needed, remaining } => write!(
                f,
                "truncated input: needed {needed} bytes but {remaining} remain"
            ),
            ErrorKind::InvalidSubtype {
                major_type,
                subtype,
            } => write!(
                f,
                "invalid argument {subtype} for major type {major_type}"
            ),
            ErrorKind::InvalidSimpleValue(v) => write!(f, "invalid simple value {v}"),
            ErrorKind::UnbalancedBreak => {
                f.write_str("break marker outside of an indefinite length item")
            }
            ErrorKind::MalformedIndefiniteMap => {
                f.write_str("indefinite length map has a key without a value")
            }
            ErrorKind::UnsupportedTag { tag } => write!(f, "unsupported tag {tag}"),
            ErrorKind::UnsupportedValue(reason) => write!(f, "unsupported value: {reason}"),
            ErrorKind::NestingTooDeep { max_depth } => {
                write!(f, "nesting exceeds the maximum depth of {max_depth}")
            }
            ErrorKind::InvalidUtf8(source) => Display::fmt(source, f),
            ErrorKind::InvalidIndefiniteChunk { major_type } => write!(
                f,
                "invalid chunk with major type {major_type} in indefinite length string"
            ),
            ErrorKind::DanglingTag { tag } => write!(f, "tag {tag} is not followed by an item"),
            ErrorKind::InvalidTimestamp(reason) => write!(f, "invalid timestamp: {reason}"),
            ErrorKind::InvalidUri(source) => write!(f, "invalid uri: {source}"),
            ErrorKind::UnclosedIndefinite { open } => {
                write!(f, "{open} indefinite length items were not closed")
            }
            ErrorKind::Io(source) => Display::fmt(source, f),
        }
    }
}

impl error::Error for ErrorKind {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ErrorKind::TruncatedInput { .. }
            | ErrorKind::InvalidSubtype { .. }
            | ErrorKind::InvalidSimpleValue(_)
            | ErrorKind::UnbalancedBreak
            | ErrorKind::MalformedIndefiniteMap
            | ErrorKind::UnsupportedTag { .. }
            | ErrorKind::UnsupportedValue(_)
            | ErrorKind::NestingTooDeep { .. }
            | ErrorKind::InvalidIndefiniteChunk { .. }
            | ErrorKind::DanglingTag { .. }
            | ErrorKind::InvalidTimestamp(_)
            | ErrorKind::UnclosedIndefinite { .. } => None,
            ErrorKind::InvalidUtf8(source) => Some(source),
            ErrorKind::InvalidUri(source) => Some(source),
            ErrorKind::Io(source) => Some(source),
        }
    }
}
