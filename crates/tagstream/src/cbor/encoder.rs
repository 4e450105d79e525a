//! The CBOR encoder.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::cbor::error::CborError;
use crate::cbor::magnitude;
use crate::cbor::options::CborEncodeOptions;
use crate::context::SerContext;
use crate::event::{replay_typed_array, EventSink, Text, TypedArrayView};
use crate::sink::BinarySink;
use crate::tag::SemanticTag;

const MILLIS_IN_SECOND: f64 = 1_000.0;
const NANOS_IN_SECOND: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    IndefiniteObject,
    Array,
    IndefiniteArray,
}

#[derive(Debug)]
struct StackItem {
    kind: ContainerKind,
    length: usize,
    index: usize,
}

impl StackItem {
    fn is_object(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::Object | ContainerKind::IndefiniteObject
        )
    }

    fn is_indefinite(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::IndefiniteObject | ContainerKind::IndefiniteArray
        )
    }

    /// Child count; a key/value pair counts as one child.
    fn count(&self) -> usize {
        if self.is_object() {
            self.index / 2
        } else {
            self.index
        }
    }
}

/// The minimum byte length worth turning into a string reference. Encoding
/// a reference to index `i` costs more bytes as `i` grows, so the threshold
/// grows with the next index to be assigned.
fn min_length_for_stringref(next_index: u64) -> usize {
    if next_index <= 0x17 {
        3
    } else if next_index <= 0xff {
        4
    } else if next_index <= 0xffff {
        5
    } else if next_index <= 0xffff_ffff {
        7
    } else {
        11
    }
}

/// An [`EventSink`] producing RFC 8949 CBOR.
///
/// Containers opened without a length are written in the indefinite-length
/// form and closed with the `0xff` break byte; containers opened with a
/// length are checked to receive exactly that many children. Dropping the
/// encoder flushes its sink.
///
/// # Examples
///
/// ```rust
/// use tagstream::cbor::CborEncoder;
/// use tagstream::{EventSink, SemanticTag, SerContext};
///
/// let mut bytes = Vec::new();
/// let mut encoder = CborEncoder::new(&mut bytes);
/// let ctx = SerContext::default();
/// encoder
///     .string_value("2013-03-21T20:04:00Z".into(), SemanticTag::DateTime, &ctx)
///     .unwrap();
/// drop(encoder);
/// assert_eq!(bytes[..2], [0xc0, 0x74]);
/// ```
pub struct CborEncoder<W: BinarySink> {
    sink: W,
    options: CborEncodeOptions,
    stack: Vec<StackItem>,
    stringref_map: BTreeMap<String, u64>,
    bytestringref_map: BTreeMap<Vec<u8>, u64>,
    next_stringref: u64,
    nesting_depth: usize,
}

impl<W: BinarySink> CborEncoder<W> {
    /// Creates an encoder with default options.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, CborEncodeOptions::default())
    }

    /// Creates an encoder with the given options. With `pack_strings`
    /// enabled, the stringref namespace tag 256 is written immediately.
    pub fn with_options(sink: W, options: CborEncodeOptions) -> Self {
        let mut encoder = Self {
            sink,
            options,
            stack: Vec::new(),
            stringref_map: BTreeMap::new(),
            bytestringref_map: BTreeMap::new(),
            next_stringref: 0,
            nesting_depth: 0,
        };
        if options.pack_strings {
            encoder.write_tag(256);
        }
        encoder
    }

    /// Wipes the container stack and the stringref state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stringref_map.clear();
        self.bytestringref_map.clear();
        self.next_stringref = 0;
        self.nesting_depth = 0;
    }

    // --------------------------------------------------------------------------------------------
    // Byte-level helpers
    // --------------------------------------------------------------------------------------------

    /// Writes an initial byte for `major` with `value` as the argument,
    /// packed into the initial byte when small, else as a big-endian
    /// 1/2/4/8-byte extension.
    fn write_head(&mut self, major: u8, value: u64) {
        let ib = major << 5;
        if value <= 0x17 {
            self.sink.push_byte(ib | value as u8);
        } else if value <= 0xff {
            self.sink.push_byte(ib | 0x18);
            self.sink.push_byte(value as u8);
        } else if value <= 0xffff {
            self.sink.push_byte(ib | 0x19);
            self.sink.append(&(value as u16).to_be_bytes());
        } else if value <= 0xffff_ffff {
            self.sink.push_byte(ib | 0x1a);
            self.sink.append(&(value as u32).to_be_bytes());
        } else {
            self.sink.push_byte(ib | 0x1b);
            self.sink.append(&value.to_be_bytes());
        }
    }

    fn write_tag(&mut self, value: u64) {
        self.write_head(6, value);
    }

    fn write_uint64_value(&mut self, value: u64) {
        self.write_head(0, value);
    }

    fn write_int64_value(&mut self, value: i64) {
        if value >= 0 {
            self.write_head(0, value as u64);
        } else {
            self.write_head(1, (-1 - value) as u64);
        }
    }

    fn write_utf8_string(&mut self, text: &str) {
        self.write_head(3, text.len() as u64);
        self.sink.append(text.as_bytes());
    }

    fn write_byte_string_body(&mut self, bytes: &[u8]) {
        self.write_head(2, bytes.len() as u64);
        self.sink.append(bytes);
    }

    /// Writes a text string, replacing repeats with tag-25 references when
    /// packing is enabled and the string is long enough to be worth it.
    fn write_string(&mut self, text: &str) {
        if self.options.pack_strings && text.len() >= min_length_for_stringref(self.next_stringref)
        {
            if let Some(&index) = self.stringref_map.get(text) {
                self.write_tag(25);
                self.write_uint64_value(index);
            } else {
                self.stringref_map
                    .insert(text.to_string(), self.next_stringref);
                self.next_stringref += 1;
                self.write_utf8_string(text);
            }
        } else {
            self.write_utf8_string(text);
        }
    }

    fn write_byte_string(&mut self, bytes: &[u8]) {
        if self.options.pack_strings
            && bytes.len() >= min_length_for_stringref(self.next_stringref)
        {
            if let Some(&index) = self.bytestringref_map.get(bytes) {
                self.write_tag(25);
                self.write_uint64_value(index);
            } else {
                self.bytestringref_map
                    .insert(bytes.to_vec(), self.next_stringref);
                self.next_stringref += 1;
                self.write_byte_string_body(bytes);
            }
        } else {
            self.write_byte_string_body(bytes);
        }
    }

    // --------------------------------------------------------------------------------------------
    // Container accounting
    // --------------------------------------------------------------------------------------------

    fn open(&mut self, kind: ContainerKind, length: usize) -> Result<(), CborError> {
        self.nesting_depth += 1;
        if self.nesting_depth > self.options.max_nesting_depth {
            return Err(CborError::MaxNestingDepthExceeded);
        }
        self.stack.push(StackItem {
            kind,
            length,
            index: 0,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), CborError> {
        debug_assert!(!self.stack.is_empty());
        let Some(item) = self.stack.last() else {
            return Ok(());
        };
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
        if item.is_indefinite() {
            self.sink.push_byte(0xff);
        } else {
            if item.count() < item.length {
                return Err(CborError::TooFewItems);
            }
            if item.count() > item.length {
                return Err(CborError::TooManyItems);
            }
        }
        self.stack.pop();
        self.end_value();
        Ok(())
    }

    fn end_value(&mut self) {
        if let Some(item) = self.stack.last_mut() {
            item.index += 1;
        }
    }

    fn begin_array_known(&mut self, length: usize) -> Result<(), CborError> {
        self.open(ContainerKind::Array, length)?;
        self.write_head(4, length as u64);
        Ok(())
    }

    fn int64_plain(&mut self, value: i64) {
        self.write_int64_value(value);
        self.end_value();
    }

    // --------------------------------------------------------------------------------------------
    // Tagged text lowering
    // --------------------------------------------------------------------------------------------

    /// Lowers decimal integer text to tag 2 (non-negative) or tag 3
    /// (negative, encoding `-1-n`) wrapping the big-endian magnitude.
    fn write_bignum_decimal(&mut self, text: &str) -> Result<(), CborError> {
        let negative = text.starts_with('-');
        let digits = text.strip_prefix('-').unwrap_or(text);
        let mut mag =
            magnitude::from_decimal(digits).ok_or(CborError::InvalidDecimalFraction)?;
        if negative && !magnitude::is_zero(&mag) {
            self.write_tag(3);
            magnitude::decrement(&mut mag);
        } else {
            self.write_tag(2);
        }
        self.write_byte_string_body(&mag);
        Ok(())
    }

    /// As above from hex digit text, for bigfloat mantissas.
    fn write_bignum_hex(&mut self, text: &str) -> Result<(), CborError> {
        let negative = text.starts_with('-');
        let digits = text.strip_prefix('-').unwrap_or(text);
        let mut mag = magnitude::from_hex(digits).ok_or(CborError::InvalidBigfloat)?;
        if negative && !magnitude::is_zero(&mag) {
            self.write_tag(3);
            magnitude::decrement(&mut mag);
        } else {
            self.write_tag(2);
        }
        self.write_byte_string_body(&mag);
        Ok(())
    }

    /// Lowers `sign? digits ('.' digits)? ([eE] sign? digits)?` to tag 4
    /// wrapping `[exponent, mantissa]`. Mantissa overflow falls through to
    /// bignum encoding.
    fn write_decimal_value(&mut self, text: &str) -> Result<(), CborError> {
        enum State {
            Start,
            Integer,
            Exp1,
            Exp2,
            Fraction1,
        }
        let mut state = State::Start;
        let mut mantissa = String::new();
        let mut exponent = String::new();
        let mut scale: i64 = 0;
        for c in text.chars() {
            match state {
                State::Start => match c {
                    '-' | '0'..='9' => {
                        mantissa.push(c);
                        state = State::Integer;
                    }
                    _ => return Err(CborError::InvalidDecimalFraction),
                },
                State::Integer => match c {
                    '0'..='9' => mantissa.push(c),
                    'e' | 'E' => state = State::Exp1,
                    '.' => state = State::Fraction1,
                    _ => return Err(CborError::InvalidDecimalFraction),
                },
                State::Exp1 => match c {
                    '+' => state = State::Exp2,
                    '-' | '0'..='9' => {
                        exponent.push(c);
                        state = State::Exp2;
                    }
                    _ => return Err(CborError::InvalidDecimalFraction),
                },
                State::Exp2 => match c {
                    '0'..='9' => exponent.push(c),
                    _ => return Err(CborError::InvalidDecimalFraction),
                },
                State::Fraction1 => match c {
                    '0'..='9' => {
                        mantissa.push(c);
                        scale -= 1;
                    }
                    'e' | 'E' => state = State::Exp1,
                    _ => return Err(CborError::InvalidDecimalFraction),
                },
            }
        }

        if !exponent.is_empty() {
            let exp: i64 = exponent
                .parse()
                .map_err(|_| CborError::InvalidDecimalFraction)?;
            scale += exp;
        }

        self.write_tag(4);
        self.begin_array_known(2)?;
        self.int64_plain(scale);
        // The state machine guarantees mantissa is sign + digits, so a
        // parse failure can only mean overflow.
        match mantissa.parse::<i64>() {
            Ok(value) => self.int64_plain(value),
            Err(_) => {
                self.write_bignum_decimal(&mantissa)?;
                self.end_value();
            }
        }
        self.close()
    }

    /// Lowers C99 hexfloat text `0x…(.hex)?([pP][+-]?hex)?` to tag 5
    /// wrapping `[binary exponent, mantissa]`.
    fn write_hexfloat_value(&mut self, text: &str) -> Result<(), CborError> {
        enum State {
            Start,
            Expect0,
            ExpectX,
            Integer,
            Exp1,
            Exp2,
            Fraction1,
        }
        let mut state = State::Start;
        let mut mantissa = String::new();
        let mut exponent = String::new();
        let mut scale: i64 = 0;
        for c in text.chars() {
            match state {
                State::Start => match c {
                    '-' => {
                        mantissa.push(c);
                        state = State::Expect0;
                    }
                    '0' => state = State::ExpectX,
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::Expect0 => match c {
                    '0' => state = State::ExpectX,
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::ExpectX => match c {
                    'x' | 'X' => state = State::Integer,
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::Integer => match c {
                    '0'..='9' | 'a'..='f' | 'A'..='F' => mantissa.push(c),
                    'p' | 'P' => state = State::Exp1,
                    '.' => state = State::Fraction1,
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::Exp1 => match c {
                    '+' => state = State::Exp2,
                    '-' | '0'..='9' | 'a'..='f' | 'A'..='F' => {
                        exponent.push(c);
                        state = State::Exp2;
                    }
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::Exp2 => match c {
                    '0'..='9' | 'a'..='f' | 'A'..='F' => exponent.push(c),
                    _ => return Err(CborError::InvalidBigfloat),
                },
                State::Fraction1 => match c {
                    '0'..='9' | 'a'..='f' | 'A'..='F' => {
                        mantissa.push(c);
                        scale -= 4;
                    }
                    'p' | 'P' => state = State::Exp1,
                    _ => return Err(CborError::InvalidBigfloat),
                },
            }
        }

        if !exponent.is_empty() {
            let exp = i64::from_str_radix(&exponent, 16)
                .map_err(|_| CborError::InvalidBigfloat)?;
            scale += exp;
        }

        self.write_tag(5);
        self.begin_array_known(2)?;
        self.int64_plain(scale);
        match i64::from_str_radix(&mantissa, 16) {
            Ok(value) => self.int64_plain(value),
            Err(_) => {
                self.write_bignum_hex(&mantissa)?;
                self.end_value();
            }
        }
        self.close()
    }

    fn write_double(&mut self, value: f64, tag: SemanticTag) {
        let mut value = value;
        match tag {
            SemanticTag::EpochSecond => self.write_tag(1),
            SemanticTag::EpochMilli => {
                self.write_tag(1);
                if value != 0.0 {
                    value /= MILLIS_IN_SECOND;
                }
            }
            SemanticTag::EpochNano => {
                self.write_tag(1);
                if value != 0.0 {
                    value /= NANOS_IN_SECOND;
                }
            }
            _ => {}
        }

        let narrowed = value as f32;
        if f64::from(narrowed) == value {
            self.sink.push_byte(0xfa);
            self.sink.append(&narrowed.to_be_bytes());
        } else {
            self.sink.push_byte(0xfb);
            self.sink.append(&value.to_be_bytes());
        }
        self.end_value();
    }
}

impl<W: BinarySink> Drop for CborEncoder<W> {
    fn drop(&mut self) {
        self.sink.flush();
    }
}

impl<W: BinarySink> EventSink for CborEncoder<W> {
    type Error = CborError;

    fn begin_object(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, CborError> {
        self.open(ContainerKind::IndefiniteObject, 0)?;
        self.sink.push_byte(0xbf);
        Ok(true)
    }

    fn begin_object_with_length(
        &mut self,
        length: usize,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        self.open(ContainerKind::Object, length)?;
        self.write_head(5, length as u64);
        Ok(true)
    }

    fn end_object(&mut self, _ctx: &SerContext) -> Result<bool, CborError> {
        self.close()?;
        Ok(true)
    }

    fn begin_array(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, CborError> {
        self.open(ContainerKind::IndefiniteArray, 0)?;
        self.sink.push_byte(0x9f);
        Ok(true)
    }

    fn begin_array_with_length(
        &mut self,
        length: usize,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        self.begin_array_known(length)?;
        Ok(true)
    }

    fn end_array(&mut self, _ctx: &SerContext) -> Result<bool, CborError> {
        self.close()?;
        Ok(true)
    }

    fn key(&mut self, name: Text<'_>, ctx: &SerContext) -> Result<bool, CborError> {
        self.string_value(name, SemanticTag::None, ctx)
    }

    fn string_value(
        &mut self,
        value: Text<'_>,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        match tag {
            SemanticTag::BigInt => {
                self.write_bignum_decimal(&value)?;
                self.end_value();
            }
            SemanticTag::BigDec => self.write_decimal_value(&value)?,
            SemanticTag::BigFloat => self.write_hexfloat_value(&value)?,
            SemanticTag::DateTime => {
                self.write_tag(0);
                self.write_string(&value);
                self.end_value();
            }
            SemanticTag::Uri => {
                self.write_tag(32);
                self.write_string(&value);
                self.end_value();
            }
            SemanticTag::Base64Url => {
                self.write_tag(33);
                self.write_string(&value);
                self.end_value();
            }
            SemanticTag::Base64 => {
                self.write_tag(34);
                self.write_string(&value);
                self.end_value();
            }
            _ => {
                self.write_string(&value);
                self.end_value();
            }
        }
        Ok(true)
    }

    fn byte_string_value(
        &mut self,
        value: &[u8],
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        match tag {
            SemanticTag::Base64Url => self.write_tag(21),
            SemanticTag::Base64 => self.write_tag(22),
            SemanticTag::Base16 => self.write_tag(23),
            _ => {}
        }
        self.write_byte_string(value);
        self.end_value();
        Ok(true)
    }

    fn byte_string_with_tag(
        &mut self,
        value: &[u8],
        ext_tag: u64,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        if self.options.pack_strings
            && value.len() >= min_length_for_stringref(self.next_stringref)
        {
            if let Some(&index) = self.bytestringref_map.get(value) {
                self.write_tag(25);
                self.write_uint64_value(index);
            } else {
                self.bytestringref_map
                    .insert(value.to_vec(), self.next_stringref);
                self.next_stringref += 1;
                self.write_tag(ext_tag);
                self.write_byte_string_body(value);
            }
        } else {
            self.write_tag(ext_tag);
            self.write_byte_string_body(value);
        }
        self.end_value();
        Ok(true)
    }

    fn int64_value(
        &mut self,
        value: i64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        match tag {
            // Rescaled to seconds, the only epoch unit tag 1 carries.
            SemanticTag::EpochMilli | SemanticTag::EpochNano => {
                self.write_double(value as f64, tag);
            }
            SemanticTag::EpochSecond => {
                self.write_tag(1);
                self.int64_plain(value);
            }
            _ => self.int64_plain(value),
        }
        Ok(true)
    }

    fn uint64_value(
        &mut self,
        value: u64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        match tag {
            SemanticTag::EpochMilli | SemanticTag::EpochNano => {
                self.write_double(value as f64, tag);
            }
            SemanticTag::EpochSecond => {
                self.write_tag(1);
                self.write_uint64_value(value);
                self.end_value();
            }
            _ => {
                self.write_uint64_value(value);
                self.end_value();
            }
        }
        Ok(true)
    }

    fn double_value(
        &mut self,
        value: f64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        self.write_double(value, tag);
        Ok(true)
    }

    fn half_value(
        &mut self,
        value: u16,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        self.sink.push_byte(0xf9);
        self.sink.append(&value.to_be_bytes());
        self.end_value();
        Ok(true)
    }

    fn bool_value(
        &mut self,
        value: bool,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        self.sink.push_byte(if value { 0xf5 } else { 0xf4 });
        self.end_value();
        Ok(true)
    }

    fn null_value(&mut self, tag: SemanticTag, _ctx: &SerContext) -> Result<bool, CborError> {
        if tag == SemanticTag::Undefined {
            self.sink.push_byte(0xf7);
        } else {
            self.sink.push_byte(0xf6);
        }
        self.end_value();
        Ok(true)
    }

    fn typed_array(
        &mut self,
        data: TypedArrayView<'_>,
        tag: SemanticTag,
        ctx: &SerContext,
    ) -> Result<bool, CborError> {
        if !self.options.use_typed_arrays {
            return replay_typed_array(self, data, tag, ctx);
        }

        let little_endian = cfg!(target_endian = "little");
        let tag_number = match data {
            TypedArrayView::U8(_) => {
                if tag == SemanticTag::Clamped {
                    0x44
                } else {
                    0x40
                }
            }
            TypedArrayView::U16(_) => {
                if little_endian {
                    0x45
                } else {
                    0x41
                }
            }
            TypedArrayView::U32(_) => {
                if little_endian {
                    0x46
                } else {
                    0x42
                }
            }
            TypedArrayView::U64(_) => {
                if little_endian {
                    0x47
                } else {
                    0x43
                }
            }
            TypedArrayView::I8(_) => 0x48,
            TypedArrayView::I16(_) => {
                if little_endian {
                    0x4d
                } else {
                    0x49
                }
            }
            TypedArrayView::I32(_) => {
                if little_endian {
                    0x4e
                } else {
                    0x4a
                }
            }
            TypedArrayView::I64(_) => {
                if little_endian {
                    0x4f
                } else {
                    0x4b
                }
            }
            TypedArrayView::Half(_) => {
                if little_endian {
                    0x54
                } else {
                    0x50
                }
            }
            TypedArrayView::F32(_) => {
                if little_endian {
                    0x55
                } else {
                    0x51
                }
            }
            TypedArrayView::F64(_) => {
                if little_endian {
                    0x56
                } else {
                    0x52
                }
            }
        };
        self.write_tag(tag_number);

        let payload: Vec<u8> = match data {
            TypedArrayView::U8(v) => v.to_vec(),
            TypedArrayView::U16(v) | TypedArrayView::Half(v) => {
                v.iter().flat_map(|x| x.to_ne_bytes()).collect()
            }
            TypedArrayView::U32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::U64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::I8(v) => v.iter().map(|x| *x as u8).collect(),
            TypedArrayView::I16(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::I32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::I64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::F32(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
            TypedArrayView::F64(v) => v.iter().flat_map(|x| x.to_ne_bytes()).collect(),
        };
        self.write_byte_string_body(&payload);
        self.end_value();
        Ok(true)
    }

    fn begin_multi_dim(
        &mut self,
        shape: &[usize],
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, CborError> {
        if tag == SemanticTag::MultiDimColumnMajor {
            self.write_tag(1040);
        } else {
            self.write_tag(40);
        }
        self.begin_array_known(2)?;
        self.begin_array_known(shape.len())?;
        for &dim in shape {
            self.write_uint64_value(dim as u64);
            self.end_value();
        }
        self.close()?;
        Ok(true)
    }

    fn end_multi_dim(&mut self, _ctx: &SerContext) -> Result<bool, CborError> {
        self.close()?;
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), CborError> {
        self.sink.flush();
        Ok(())
    }
}
