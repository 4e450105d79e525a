//! The event contract between producers and sinks.
//!
//! A producer (the JSON parser, or [`Value::accept`](crate::Value::accept))
//! drives an [`EventSink`] one event at a time. Sinks vary independently of
//! producers: the tree decoder, the CBOR encoder, and [`EventCapture`] are
//! all plain `EventSink` implementations.

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;
use core::ops::Deref;

use crate::context::SerContext;
use crate::tag::{BytesTag, SemanticTag};

/// A borrowed text payload, explicit about what it borrows from.
///
/// Events carrying text reference either the producer's input buffer
/// (zero-copy, no escape was expanded) or its scratch buffer (escapes were
/// expanded or the token spanned a chunk boundary). The two paths are
/// semantically equivalent; the distinction exists so sinks that care about
/// retention can tell them apart. Either way the view is valid only for the
/// duration of the event call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text<'a> {
    /// Borrowed straight from the unconsumed input window.
    Input(&'a str),
    /// Borrowed from the producer's scratch buffer.
    Scratch(&'a str),
}

impl<'a> Text<'a> {
    /// The underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match self {
            Text::Input(s) | Text::Scratch(s) => s,
        }
    }
}

impl Deref for Text<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<'a> From<&'a str> for Text<'a> {
    fn from(s: &'a str) -> Self {
        Text::Input(s)
    }
}

impl PartialEq<&str> for Text<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A borrowed span of scalars for the typed-array fast path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedArrayView<'a> {
    U8(&'a [u8]),
    U16(&'a [u16]),
    U32(&'a [u32]),
    U64(&'a [u64]),
    I8(&'a [i8]),
    I16(&'a [i16]),
    I32(&'a [i32]),
    I64(&'a [i64]),
    /// IEEE 754 binary16 values carried as raw bits.
    Half(&'a [u16]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl TypedArrayView<'_> {
    /// Number of elements in the span.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TypedArrayView::U8(v) => v.len(),
            TypedArrayView::U16(v) | TypedArrayView::Half(v) => v.len(),
            TypedArrayView::U32(v) => v.len(),
            TypedArrayView::U64(v) => v.len(),
            TypedArrayView::I8(v) => v.len(),
            TypedArrayView::I16(v) => v.len(),
            TypedArrayView::I32(v) => v.len(),
            TypedArrayView::I64(v) => v.len(),
            TypedArrayView::F32(v) => v.len(),
            TypedArrayView::F64(v) => v.len(),
        }
    }

    /// Returns `true` if the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A consumer of events.
///
/// Every value-shaped method returns `Result<bool, Self::Error>`:
/// `Ok(true)` to keep going, `Ok(false)` to stop the producer cooperatively
/// (the producer reports `stopped`), and `Err` to terminate the stream with
/// an error. No in-flight event is retracted by cancellation.
///
/// `key` is always followed by exactly one value event at the same level.
/// `typed_array` and the multi-dimensional pair are optional fast paths;
/// their default implementations replay the data as ordinary containers.
pub trait EventSink {
    /// Error type surfaced through the producer when this sink fails.
    type Error;

    /// Opens an object of unknown length.
    fn begin_object(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// Opens an object whose member count is known in advance.
    fn begin_object_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error> {
        let _ = length;
        self.begin_object(tag, ctx)
    }

    /// Closes the innermost object.
    fn end_object(&mut self, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// Opens an array of unknown length.
    fn begin_array(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// Opens an array whose element count is known in advance.
    fn begin_array_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error> {
        let _ = length;
        self.begin_array(tag, ctx)
    }

    /// Closes the innermost array.
    fn end_array(&mut self, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// An object member key.
    fn key(&mut self, name: Text<'_>, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// A text value.
    fn string_value(
        &mut self,
        value: Text<'_>,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// A byte-string value with a semantic tag.
    fn byte_string_value(
        &mut self,
        value: &[u8],
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// A byte-string value with a raw integer tag, passed through verbatim
    /// by binary codecs.
    fn byte_string_with_tag(
        &mut self,
        value: &[u8],
        ext_tag: u64,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error> {
        let _ = ext_tag;
        self.byte_string_value(value, SemanticTag::None, ctx)
    }

    /// A signed integer value.
    fn int64_value(
        &mut self,
        value: i64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// An unsigned integer value.
    fn uint64_value(
        &mut self,
        value: u64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// A double value.
    fn double_value(
        &mut self,
        value: f64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// An IEEE 754 binary16 value carried as raw bits.
    fn half_value(
        &mut self,
        value: u16,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// A boolean value.
    fn bool_value(
        &mut self,
        value: bool,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error>;

    /// A null value. The `Undefined` tag selects CBOR's `undefined`.
    fn null_value(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Self::Error>;

    /// A homogeneous scalar array, as one event.
    fn typed_array(
        &mut self,
        data: TypedArrayView<'_>,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error> {
        replay_typed_array(self, data, tag, ctx)
    }

    /// Opens a multi-dimensional array with the given shape. The element
    /// data follows as a `typed_array` or ordinary array, then
    /// `end_multi_dim`.
    fn begin_multi_dim(
        &mut self,
        shape: &[usize],
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Self::Error> {
        let _ = tag;
        if !self.begin_array_with_length(2, SemanticTag::None, ctx)? {
            return Ok(false);
        }
        if !self.begin_array_with_length(shape.len(), SemanticTag::None, ctx)? {
            return Ok(false);
        }
        for &dim in shape {
            if !self.uint64_value(dim as u64, SemanticTag::None, ctx)? {
                return Ok(false);
            }
        }
        self.end_array(ctx)
    }

    /// Closes a multi-dimensional array.
    fn end_multi_dim(&mut self, ctx: &SerContext) -> Result<bool, Self::Error> {
        self.end_array(ctx)
    }

    /// Releases any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Replays a typed array as an ordinary array of scalars, honouring a
/// cooperative stop from the sink.
pub(crate) fn replay_typed_array<S: EventSink + ?Sized>(
    sink: &mut S,
    data: TypedArrayView<'_>,
    tag: SemanticTag,
    ctx: &SerContext,
) -> Result<bool, S::Error> {
    macro_rules! replay {
        ($items:expr, $emit:expr) => {{
            if !sink.begin_array_with_length($items.len(), SemanticTag::None, ctx)? {
                return Ok(false);
            }
            for &item in $items {
                if !$emit(&mut *sink, item)? {
                    return Ok(false);
                }
            }
            sink.end_array(ctx)
        }};
    }
    match data {
        TypedArrayView::U8(items) => replay!(items, |s: &mut S, v: u8| s.uint64_value(
            u64::from(v),
            tag,
            ctx
        )),
        TypedArrayView::U16(items) => replay!(items, |s: &mut S, v: u16| s.uint64_value(
            u64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::U32(items) => replay!(items, |s: &mut S, v: u32| s.uint64_value(
            u64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::U64(items) => replay!(items, |s: &mut S, v: u64| s.uint64_value(
            v,
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::I8(items) => replay!(items, |s: &mut S, v: i8| s.int64_value(
            i64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::I16(items) => replay!(items, |s: &mut S, v: i16| s.int64_value(
            i64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::I32(items) => replay!(items, |s: &mut S, v: i32| s.int64_value(
            i64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::I64(items) => replay!(items, |s: &mut S, v: i64| s.int64_value(
            v,
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::Half(items) => replay!(items, |s: &mut S, v: u16| s.half_value(
            v,
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::F32(items) => replay!(items, |s: &mut S, v: f32| s.double_value(
            f64::from(v),
            SemanticTag::None,
            ctx
        )),
        TypedArrayView::F64(items) => replay!(items, |s: &mut S, v: f64| s.double_value(
            v,
            SemanticTag::None,
            ctx
        )),
    }
}

/// An owned event, as captured by [`EventCapture`] or pulled from an
/// [`EventCursor`](crate::EventCursor).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseEvent {
    BeginObject {
        length: Option<usize>,
        tag: SemanticTag,
    },
    EndObject,
    BeginArray {
        length: Option<usize>,
        tag: SemanticTag,
    },
    EndArray,
    Key(String),
    String {
        value: String,
        tag: SemanticTag,
    },
    Bytes {
        value: Vec<u8>,
        tag: BytesTag,
    },
    Int64 {
        value: i64,
        tag: SemanticTag,
    },
    UInt64 {
        value: u64,
        tag: SemanticTag,
    },
    Double {
        value: f64,
        tag: SemanticTag,
    },
    Half {
        value: u16,
        tag: SemanticTag,
    },
    Bool {
        value: bool,
        tag: SemanticTag,
    },
    Null {
        tag: SemanticTag,
    },
}

/// A sink that copies every event out into an owned queue.
///
/// Used by [`EventCursor`](crate::EventCursor) and handy in tests: events
/// are stored together with the [`SerContext`] observed when they fired.
#[derive(Debug, Default)]
pub struct EventCapture {
    events: VecDeque<(ParseEvent, SerContext)>,
}

impl EventCapture {
    /// Creates an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of captured events not yet popped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and returns the oldest captured event.
    pub fn pop(&mut self) -> Option<(ParseEvent, SerContext)> {
        self.events.pop_front()
    }

    /// Iterates over the queued events in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &(ParseEvent, SerContext)> {
        self.events.iter()
    }

    /// Consumes the sink, returning the queued events in capture order.
    #[must_use]
    pub fn into_events(self) -> Vec<(ParseEvent, SerContext)> {
        self.events.into_iter().collect()
    }

    fn record(&mut self, event: ParseEvent, ctx: &SerContext) -> Result<bool, Infallible> {
        self.events.push_back((event, *ctx));
        Ok(true)
    }
}

impl EventSink for EventCapture {
    type Error = Infallible;

    fn begin_object(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::BeginObject { length: None, tag }, ctx)
    }

    fn begin_object_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(
            ParseEvent::BeginObject {
                length: Some(length),
                tag,
            },
            ctx,
        )
    }

    fn end_object(&mut self, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::EndObject, ctx)
    }

    fn begin_array(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::BeginArray { length: None, tag }, ctx)
    }

    fn begin_array_with_length(
        &mut self,
        length: usize,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(
            ParseEvent::BeginArray {
                length: Some(length),
                tag,
            },
            ctx,
        )
    }

    fn end_array(&mut self, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::EndArray, ctx)
    }

    fn key(&mut self, name: Text<'_>, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::Key(name.to_string()), ctx)
    }

    fn string_value(
        &mut self,
        value: Text<'_>,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(
            ParseEvent::String {
                value: value.to_string(),
                tag,
            },
            ctx,
        )
    }

    fn byte_string_value(
        &mut self,
        value: &[u8],
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(
            ParseEvent::Bytes {
                value: value.to_vec(),
                tag: BytesTag::Semantic(tag),
            },
            ctx,
        )
    }

    fn byte_string_with_tag(
        &mut self,
        value: &[u8],
        ext_tag: u64,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(
            ParseEvent::Bytes {
                value: value.to_vec(),
                tag: BytesTag::Ext(ext_tag),
            },
            ctx,
        )
    }

    fn int64_value(
        &mut self,
        value: i64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(ParseEvent::Int64 { value, tag }, ctx)
    }

    fn uint64_value(
        &mut self,
        value: u64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(ParseEvent::UInt64 { value, tag }, ctx)
    }

    fn double_value(
        &mut self,
        value: f64,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(ParseEvent::Double { value, tag }, ctx)
    }

    fn half_value(
        &mut self,
        value: u16,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(ParseEvent::Half { value, tag }, ctx)
    }

    fn bool_value(
        &mut self,
        value: bool,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.record(ParseEvent::Bool { value, tag }, ctx)
    }

    fn null_value(&mut self, tag: SemanticTag, ctx: &SerContext) -> Result<bool, Infallible> {
        self.record(ParseEvent::Null { tag }, ctx)
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
