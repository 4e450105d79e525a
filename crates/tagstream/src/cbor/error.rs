//! CBOR encoder errors.

use thiserror::Error;

/// Errors raised while encoding CBOR.
///
/// The encoder never consults a recovery handler: it reports the first
/// error and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CborError {
    #[error("invalid decimal fraction")]
    InvalidDecimalFraction,
    #[error("invalid bigfloat")]
    InvalidBigfloat,
    #[error("too few items added to definite-length container")]
    TooFewItems,
    #[error("too many items added to definite-length container")]
    TooManyItems,
    #[error("maximum nesting depth exceeded")]
    MaxNestingDepthExceeded,
}
