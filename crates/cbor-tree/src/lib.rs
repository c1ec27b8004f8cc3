//! # CBOR Tree
//!
//! CBOR Tree is a library which decodes and encodes the [Concise Binary Object
//! Representation (CBOR)][cbor] data format as a tree of [`Value`]s. CBOR is
//! specified in [RFC 8949][rfc_8949]. Imagine starting with the JSON data
//! model, making it more efficient by using a binary (instead of plain text)
//! format, and adding some extensibility to allow more types.
//!
//! ```
//! use cbor_tree::{decode, to_vec, Value};
//!
//! let value = decode(&[0xa1, 0x61, 0x61, 0x9f, 0x01, 0xf9, 0x3c, 0x00, 0xff])?;
//! assert_eq!(value["a"][0], Value::from(1));
//! assert_eq!(value["a"][1], Value::from(1.0));
//!
//! // Indefinite length items are written with definite lengths.
//! assert_eq!(to_vec(&value)?, [0xa1, 0x61, 0x61, 0x82, 0x01, 0xf9, 0x3c, 0x00]);
//! # Ok::<(), cbor_tree::Error>(())
//! ```
//!
//! Tags for date/times (0 and 1), bignums (2 and 3), and URIs (32) are
//! interpreted. Other tags are dropped unless
//! [`DecodeOptions::unknown_tags`] is [`TagPolicy::Reject`].
//!
//! The library does not install a logger. Decoding and encoding emit `trace`
//! and `debug` records through the [`log`] facade.
//!
//! ## License
//!
//! Licensed under either of [Apache License, Version 2.0][LICENSE_APACHE] or [MIT
//! License][LICENSE_MIT] at your option.
//!
//! ### Contributions
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.
//!
//! [LICENSE_APACHE]: LICENSE-APACHE
//! [LICENSE_MIT]: LICENSE-MIT
//! [cbor]: https://cbor.io/
//! [rfc_8949]: https://www.rfc-editor.org/rfc/rfc8949.html
//! [`log`]: https://docs.rs/log

#![cfg_attr(docsrs, feature(doc_cfg))]

mod bstring;
pub mod decode;
pub mod encode;
mod error;
mod float;
mod head;
mod read;
mod simple;
pub mod tag;
pub mod value;

#[doc(inline)]
pub use bstring::ByteString;
#[doc(inline)]
pub use decode::{
    decode, decode_all, decode_one, decode_with_options, DecodeOptions, DEFAULT_MAX_DEPTH,
};
#[doc(inline)]
pub use encode::{encode, to_vec, to_writer, EncodeOptions, Encoder, TimeRepresentation};
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use float::FloatWidth;
#[doc(inline)]
pub use tag::TagPolicy;
#[doc(inline)]
pub use value::{BigNum, Float, Int, Value};

/// Initial byte of an unsigned integer with an argument of 0.
pub(crate) const IB_UINT_MIN: u8 = 0x00;
/// Initial byte of a negative integer with an argument of 0.
pub(crate) const IB_NEG_INT_MIN: u8 = 0x20;
/// Initial byte of a byte string with a length of 0.
pub(crate) const IB_BYTE_STR_MIN: u8 = 0x40;
/// Initial byte of a text string with a length of 0.
pub(crate) const IB_TEXT_STR_MIN: u8 = 0x60;
/// Initial byte of an array with a length of 0.
pub(crate) const IB_ARRAY_MIN: u8 = 0x80;
/// Initial byte of a map with a length of 0.
pub(crate) const IB_MAP_MIN: u8 = 0xa0;
/// Initial byte of tag 0.
pub(crate) const IB_TAG_MIN: u8 = 0xc0;
/// Initial byte of simple value 0.
pub(crate) const IB_FP_SIMPLE_MIN: u8 = 0xe0;
/// The break marker which ends an indefinite length item.
pub(crate) const IB_BREAK: u8 = 0xff;
