//! Streaming codecs for self-describing data: an incremental JSON parser, a
//! tree decoder, and a CBOR encoder, all speaking one semantic-tagged event
//! contract.
//!
//! The parser is a resumable state machine: feed it byte chunks split at any
//! boundary (even inside a UTF-8 sequence or a `\u` escape) and it emits the
//! same events it would have for the whole document at once. Any
//! [`EventSink`] can consume those events: [`TreeDecoder`] materialises a
//! tagged [`Value`] tree, [`CborEncoder`] re-serialises to RFC 8949 binary,
//! and [`EventCursor`] turns the push stream into a pull-style reader.
//!
//! ```rust
//! use tagstream::{EventCapture, JsonParser, ParseOptions};
//!
//! let mut parser = JsonParser::new(ParseOptions::default());
//! let mut events = EventCapture::new();
//! parser.update(br#"[1, "two"]"#);
//! parser.finish_parse(&mut events).unwrap();
//! assert_eq!(events.len(), 4);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod context;
mod cursor;
mod decoder;
mod error;
mod event;
mod num;
mod options;
mod parser;
mod sink;
mod tag;
mod utf8;
mod value;

pub mod cbor;

pub use context::SerContext;
pub use cursor::EventCursor;
pub use decoder::TreeDecoder;
pub use error::{ErrorSource, JsonErrorKind, ParseError};
pub use event::{EventCapture, EventSink, ParseEvent, Text, TypedArrayView};
pub use options::ParseOptions;
pub use parser::{ErrorHandler, JsonParser};
pub use sink::{BinarySink, CharSink};
pub use tag::{BytesTag, SemanticTag};
pub use value::Value;

use alloc::vec::Vec;

use cbor::{CborEncodeOptions, CborEncoder, CborError};

/// Parses a complete JSON document into a [`Value`] tree.
///
/// Rejects any non-whitespace bytes after the root value.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the error kind and the line/column where
/// parsing failed.
///
/// # Examples
///
/// ```rust
/// use tagstream::{decode_json, ParseOptions, Value};
///
/// let value = decode_json(br#"{"a": 1}"#, ParseOptions::default()).unwrap();
/// assert_eq!(value["a"], Value::from(1i64));
/// ```
pub fn decode_json(data: &[u8], options: ParseOptions) -> Result<Value, ParseError> {
    let mut parser = JsonParser::new(options);
    let mut decoder = TreeDecoder::new();
    parser.update(data);
    parser.finish_parse(&mut decoder)?;
    parser.check_done()?;
    match decoder.get_result() {
        Some(value) => Ok(value),
        None => Err(ParseError::syntax(
            JsonErrorKind::UnexpectedEof,
            parser.line(),
            parser.column(),
        )),
    }
}

/// Encodes a [`Value`] tree as CBOR bytes.
///
/// Containers are written with definite lengths, matching the shape of the
/// tree.
///
/// # Errors
///
/// Returns a [`CborError`] when a tagged payload cannot be lowered (for
/// example a malformed `bigdec` string) or the nesting limit is exceeded.
///
/// # Examples
///
/// ```rust
/// use tagstream::{decode_json, encode_cbor, ParseOptions};
/// use tagstream::cbor::CborEncodeOptions;
///
/// let value = decode_json(b"[2,3]", ParseOptions::default()).unwrap();
/// let bytes = encode_cbor(&value, CborEncodeOptions::default()).unwrap();
/// assert_eq!(bytes, [0x82, 0x02, 0x03]);
/// ```
pub fn encode_cbor(value: &Value, options: CborEncodeOptions) -> Result<Vec<u8>, CborError> {
    let mut bytes = Vec::new();
    let mut encoder = CborEncoder::with_options(&mut bytes, options);
    value.accept(&mut encoder)?;
    drop(encoder);
    Ok(bytes)
}

#[cfg(test)]
mod tests;
