//! The tagged tree value produced by [`TreeDecoder`](crate::TreeDecoder).

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Write as _;

use crate::context::SerContext;
use crate::event::{EventSink, Text};
use crate::sink::CharSink;
use crate::tag::{BytesTag, SemanticTag};

/// An insertion-ordered object representation.
pub type Members = Vec<(String, Value)>;

/// A tree value assembled from an event stream.
///
/// Every leaf carries its semantic tag; objects preserve insertion order and
/// keep duplicate keys in arrival order.
///
/// # Examples
///
/// ```rust
/// use tagstream::Value;
///
/// let v = Value::Array(vec![Value::from(1i64), Value::from("two")]);
/// assert_eq!(v.to_string(), r#"[1,"two"]"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null(SemanticTag),
    Bool(bool, SemanticTag),
    Int(i64, SemanticTag),
    UInt(u64, SemanticTag),
    Double(f64, SemanticTag),
    String(String, SemanticTag),
    Bytes(Vec<u8>, BytesTag),
    Array(Vec<Value>),
    Object(Members),
}

const NULL: Value = Value::Null(SemanticTag::None);

impl Default for Value {
    fn default() -> Self {
        NULL
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v, SemanticTag::None)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v, SemanticTag::None)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v, SemanticTag::None)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v, SemanticTag::None)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string(), SemanticTag::None)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v, SemanticTag::None)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl Value {
    /// A null value with no tag.
    #[must_use]
    pub fn null() -> Self {
        NULL
    }

    /// Returns `true` if the value is `Null`, regardless of tag.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// The semantic tag, for leaves that carry one.
    #[must_use]
    pub fn tag(&self) -> Option<SemanticTag> {
        match self {
            Self::Null(tag)
            | Self::Bool(_, tag)
            | Self::Int(_, tag)
            | Self::UInt(_, tag)
            | Self::Double(_, tag)
            | Self::String(_, tag) => Some(*tag),
            Self::Bytes(_, BytesTag::Semantic(tag)) => Some(*tag),
            Self::Bytes(_, BytesTag::Ext(_)) | Self::Array(_) | Self::Object(_) => None,
        }
    }

    /// Returns the string slice if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s, _) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b, _) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v, _) => Some(*v),
            Self::UInt(v, _) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v, _) => Some(*v),
            Self::Int(v, _) => Some(*v as f64),
            Self::UInt(v, _) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the elements if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the members if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Members> {
        match self {
            Self::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Looks up the first member with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Writes the compact JSON form of this tree into a character sink and
    /// flushes it.
    pub fn write_json<S: CharSink>(&self, sink: &mut S) {
        struct Adapter<'a, S: CharSink>(&'a mut S);

        impl<S: CharSink> fmt::Write for Adapter<'_, S> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.0.append(s);
                Ok(())
            }

            fn write_char(&mut self, c: char) -> fmt::Result {
                self.0.push_char(c);
                Ok(())
            }
        }

        // The adapter never reports failure, so formatting cannot either.
        let _ = write!(Adapter(sink), "{self}");
        sink.flush();
    }

    /// Replays this tree into `sink` as events, using definite container
    /// lengths. Stops early without error if the sink declines an event.
    ///
    /// # Errors
    ///
    /// Propagates the sink's error.
    pub fn accept<S: EventSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        let ctx = SerContext::default();
        self.accept_with(sink, &ctx).map(|_keep_going| ())
    }

    fn accept_with<S: EventSink>(&self, sink: &mut S, ctx: &SerContext) -> Result<bool, S::Error> {
        match self {
            Self::Null(tag) => sink.null_value(*tag, ctx),
            Self::Bool(v, tag) => sink.bool_value(*v, *tag, ctx),
            Self::Int(v, tag) => sink.int64_value(*v, *tag, ctx),
            Self::UInt(v, tag) => sink.uint64_value(*v, *tag, ctx),
            Self::Double(v, tag) => sink.double_value(*v, *tag, ctx),
            Self::String(s, tag) => sink.string_value(Text::Input(s), *tag, ctx),
            Self::Bytes(b, BytesTag::Semantic(tag)) => sink.byte_string_value(b, *tag, ctx),
            Self::Bytes(b, BytesTag::Ext(ext)) => sink.byte_string_with_tag(b, *ext, ctx),
            Self::Array(items) => {
                if !sink.begin_array_with_length(items.len(), SemanticTag::None, ctx)? {
                    return Ok(false);
                }
                for item in items {
                    if !item.accept_with(sink, ctx)? {
                        return Ok(false);
                    }
                }
                sink.end_array(ctx)
            }
            Self::Object(members) => {
                if !sink.begin_object_with_length(members.len(), SemanticTag::None, ctx)? {
                    return Ok(false);
                }
                for (key, value) in members {
                    if !sink.key(Text::Input(key), ctx)? {
                        return Ok(false);
                    }
                    if !value.accept_with(sink, ctx)? {
                        return Ok(false);
                    }
                }
                sink.end_object(ctx)
            }
        }
    }
}

impl core::ops::Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl core::ops::Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        match self {
            Self::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

pub(crate) fn write_escaped_string<W: fmt::Write>(src: &str, f: &mut W) -> fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() && (c as u32) <= 0xffff => write!(f, "\\u{:04X}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

const BASE64URL_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Unpadded base64url, the default rendering of byte strings in JSON text.
fn write_base64url<W: fmt::Write>(bytes: &[u8], f: &mut W) -> fmt::Result {
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);
        f.write_char(BASE64URL_ALPHABET[(b0 >> 2) as usize] as char)?;
        f.write_char(BASE64URL_ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize] as char)?;
        if chunk.len() > 1 {
            f.write_char(BASE64URL_ALPHABET[(((b1 & 0x0f) << 2) | (b2 >> 6)) as usize] as char)?;
        }
        if chunk.len() > 2 {
            f.write_char(BASE64URL_ALPHABET[(b2 & 0x3f) as usize] as char)?;
        }
    }
    Ok(())
}

/// Compact JSON text. Non-finite doubles render as `null`; byte strings as
/// base64url text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => f.write_str("null"),
            Value::Bool(b, _) => f.write_str(if *b { "true" } else { "false" }),
            Value::Int(v, _) => write!(f, "{v}"),
            Value::UInt(v, _) => write!(f, "{v}"),
            Value::Double(v, _) => {
                if v.is_finite() {
                    write!(f, "{v}")
                } else {
                    f.write_str("null")
                }
            }
            Value::String(s, _) => {
                f.write_char('"')?;
                write_escaped_string(s, f)?;
                f.write_char('"')
            }
            Value::Bytes(b, _) => {
                f.write_char('"')?;
                write_base64url(b, f)?;
                f.write_char('"')
            }
            Value::Array(items) => {
                f.write_char('[')?;
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_char(',')?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Object(members) => {
                f.write_char('{')?;
                let mut first = true;
                for (key, value) in members {
                    if !first {
                        f.write_char(',')?;
                    }
                    first = false;
                    f.write_char('"')?;
                    write_escaped_string(key, f)?;
                    f.write_str("\":")?;
                    write!(f, "{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}
