//! Semantic tags attached to events and tree values.

/// Extra type information carried alongside an event or tree value.
///
/// Tags survive transcoding: the JSON parser attaches `BigInt`/`BigDec` to
/// out-of-range numbers, the CBOR encoder maps tags onto RFC 8949 tag
/// numbers, and the tree decoder stores them on leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SemanticTag {
    /// No tag.
    #[default]
    None,
    /// An arbitrary-precision integer carried as decimal text.
    BigInt,
    /// An arbitrary-precision decimal carried as text.
    BigDec,
    /// An arbitrary-precision binary float carried as C99 hexfloat text.
    BigFloat,
    /// An RFC 3339 date-time string.
    DateTime,
    /// Seconds since the Unix epoch.
    EpochSecond,
    /// Milliseconds since the Unix epoch.
    EpochMilli,
    /// Nanoseconds since the Unix epoch.
    EpochNano,
    /// Byte string with a base16 display preference.
    Base16,
    /// Byte string or text with a base64 display preference.
    Base64,
    /// Byte string or text with a base64url display preference.
    Base64Url,
    /// A URI string.
    Uri,
    /// The CBOR `undefined` simple value, carried on `null` events.
    Undefined,
    /// A clamped `u8` typed array.
    Clamped,
    /// Multi-dimensional array, row-major element order.
    MultiDimRowMajor,
    /// Multi-dimensional array, column-major element order.
    MultiDimColumnMajor,
}

/// The tag carried by a byte-string event or value: either a [`SemanticTag`]
/// or a raw integer tag passed through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BytesTag {
    /// A semantic tag, mapped by each codec onto its own representation.
    Semantic(SemanticTag),
    /// A raw tag number emitted as-is by binary codecs.
    Ext(u64),
}

impl Default for BytesTag {
    fn default() -> Self {
        Self::Semantic(SemanticTag::None)
    }
}

impl From<SemanticTag> for BytesTag {
    fn from(tag: SemanticTag) -> Self {
        Self::Semantic(tag)
    }
}
