//! RFC 8949 CBOR encoding over the event contract.
//!
//! [`CborEncoder`] is an [`EventSink`](crate::EventSink): drive it from the
//! JSON parser to transcode a document, or from
//! [`Value::accept`](crate::Value::accept) to serialise a tree.

mod encoder;
mod error;
mod magnitude;
mod options;

pub use encoder::CborEncoder;
pub use error::CborError;
pub use options::CborEncodeOptions;
