//! The incremental JSON parser.
//!
//! `JsonParser` is a resumable state machine: push byte chunks with
//! [`update`](JsonParser::update), then drive events into any
//! [`EventSink`] with [`parse_some`](JsonParser::parse_some) or
//! [`finish_parse`](JsonParser::finish_parse). Chunks may split the input at
//! any byte boundary; the parser persists its inner state and partial
//! accumulations and resumes exactly where it left off, producing the same
//! events as a single-chunk feed of the concatenated input.

#![allow(clippy::too_many_lines)]

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::buffer::SourceBuffer;
use crate::context::SerContext;
use crate::error::{JsonErrorKind, ParseError};
use crate::event::{EventSink, Text};
use crate::num::{self, DoubleParse};
use crate::options::ParseOptions;
use crate::tag::SemanticTag;
use crate::utf8;

// ------------------------------------------------------------------------------------------------
// State machines
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Root,
    Start,
    Accept,
    Slash,
    SlashSlash,
    SlashStar,
    SlashStarStar,
    ExpectCommaOrEnd,
    Object,
    ExpectMemberNameOrEnd,
    ExpectMemberName,
    ExpectColon,
    ExpectValueOrEnd,
    ExpectValue,
    Array,
    String,
    MemberName,
    Number,
    N,
    Nu,
    Nul,
    T,
    Tr,
    Tru,
    F,
    Fa,
    Fal,
    Fals,
    Cr,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StringState {
    #[default]
    Text,
    Escape,
    EscapeU1,
    EscapeU2,
    EscapeU3,
    EscapeU4,
    SurrogatePair1,
    SurrogatePair2,
    EscapeU5,
    EscapeU6,
    EscapeU7,
    EscapeU8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum NumberState {
    #[default]
    Minus,
    Zero,
    Integer,
    Fraction1,
    Fraction2,
    Exp1,
    Exp2,
    Exp3,
}

/// Where the finished string token lives: the scratch buffer, or a span of
/// the input window identified by absolute buffer indices.
#[derive(Debug, Clone, Copy)]
enum StrSpan {
    Scratch,
    Input { start: usize, end: usize },
}

/// Control bytes that are illegal anywhere in a document. `\t`, `\n` and
/// `\r` are whitespace between tokens and handled separately inside strings.
macro_rules! illegal_control {
    () => {
        0x00..=0x08 | 0x0b | 0x0c | 0x0e..=0x1f
    };
}

/// Calls into the sink, converting a sink error into a terminated parse.
/// Evaluates to the sink's keep-going flag.
macro_rules! emit {
    ($self:ident, $call:expr) => {
        match $call {
            Ok(keep_going) => keep_going,
            Err(err) => {
                $self.more = false;
                return Err(ParseError::sink(err, $self.line, $self.column()));
            }
        }
    };
}

fn default_recovery(kind: JsonErrorKind, _ctx: &SerContext) -> bool {
    matches!(kind, JsonErrorKind::IllegalComment)
}

/// The recovery handler consulted before an error is raised. Returning
/// `true` makes the parser skip the offending input and resume.
pub type ErrorHandler = Box<dyn FnMut(JsonErrorKind, &SerContext) -> bool>;

/// An incremental, resumable JSON parser.
///
/// # Examples
///
/// ```rust
/// use tagstream::{EventCapture, JsonParser, ParseOptions};
///
/// let mut parser = JsonParser::new(ParseOptions::default());
/// let mut events = EventCapture::new();
/// parser.update(br#"{"key": [null, true]}"#);
/// parser.finish_parse(&mut events).unwrap();
/// assert_eq!(events.len(), 7);
/// ```
pub struct JsonParser {
    max_nesting_depth: usize,
    allow_trailing_comma: bool,
    allow_comments: bool,
    lossless_number: bool,
    lossless_bignum: bool,
    err_handler: ErrorHandler,
    string_double_map: Vec<(String, f64)>,

    level: usize,
    cp: u32,
    cp2: u32,
    line: usize,
    /// Absolute byte offset just past the last consumed byte.
    position: usize,
    /// Offset of the first byte after the last line break.
    mark_position: usize,
    /// Offset of the current token's first byte.
    begin_position: usize,
    source: SourceBuffer,
    state: ParseState,
    string_state: StringState,
    number_state: NumberState,
    more: bool,
    done: bool,
    cursor_mode: bool,
    mark_level: usize,
    /// Unescaped form of the string (or digits of the number) being parsed.
    scratch: Vec<u8>,
    state_stack: Vec<ParseState>,
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl JsonParser {
    /// Creates a parser with the default recovery behaviour: every error
    /// aborts except `illegal_comment` when comments are enabled.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self::with_err_handler(options, Box::new(default_recovery))
    }

    /// Creates a parser with a custom recovery handler.
    #[must_use]
    pub fn with_err_handler(options: ParseOptions, err_handler: ErrorHandler) -> Self {
        let mut string_double_map = Vec::new();
        if let Some(text) = options.nan_literal {
            string_double_map.push((text, f64::NAN));
        }
        if let Some(text) = options.inf_literal {
            string_double_map.push((text, f64::INFINITY));
        }
        if let Some(text) = options.neg_inf_literal {
            string_double_map.push((text, f64::NEG_INFINITY));
        }
        let mut state_stack = Vec::with_capacity(16);
        state_stack.push(ParseState::Root);
        Self {
            max_nesting_depth: options.max_nesting_depth,
            allow_trailing_comma: options.allow_trailing_comma,
            allow_comments: options.allow_comments,
            lossless_number: options.lossless_number,
            lossless_bignum: options.lossless_bignum,
            err_handler,
            string_double_map,
            level: 0,
            cp: 0,
            cp2: 0,
            line: 1,
            position: 0,
            mark_position: 0,
            begin_position: 0,
            source: SourceBuffer::new(),
            state: ParseState::Start,
            string_state: StringState::default(),
            number_state: NumberState::default(),
            more: true,
            done: false,
            cursor_mode: false,
            mark_level: 0,
            scratch: Vec::with_capacity(256),
            state_stack,
        }
    }

    /// Pushes a chunk of input. Chunks may split the document anywhere,
    /// including inside multi-byte UTF-8 sequences and escapes.
    pub fn update(&mut self, data: &[u8]) {
        self.source.push(data);
    }

    /// When enabled, the parser suspends after every value event so the
    /// host loop can hand control back to user code. Re-enable progress
    /// with [`restart`](Self::restart).
    pub fn cursor_mode(&mut self, on: bool) {
        self.cursor_mode = on;
    }

    /// Re-enables progress after a cursor-mode suspension or a sink stop.
    pub fn restart(&mut self) {
        self.more = true;
    }

    /// The nesting level at which the parser suspends, for bounded
    /// sub-tree traversal. `0` disables the mark.
    #[must_use]
    pub fn mark_level(&self) -> usize {
        self.mark_level
    }

    /// Sets the mark level. When a container close returns the nesting
    /// level to this value, the parser suspends.
    pub fn set_mark_level(&mut self, level: usize) {
        self.mark_level = level;
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns `true` once the root value has been consumed and the sink
    /// flushed.
    #[must_use]
    pub fn done(&self) -> bool {
        self.done
    }

    /// Returns `true` while the parser will not make progress without a
    /// call to [`restart`](Self::restart).
    #[must_use]
    pub fn stopped(&self) -> bool {
        !self.more
    }

    /// Returns `true` when a complete root value has been parsed.
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.state == ParseState::Accept || self.done
    }

    /// Returns `true` when parsing has terminated, successfully or not.
    #[must_use]
    pub fn finished(&self) -> bool {
        !self.more && self.state != ParseState::Accept
    }

    /// Returns `true` when every pushed byte has been consumed.
    #[must_use]
    pub fn source_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    /// 1-based line of the current position.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the current position.
    #[must_use]
    pub fn column(&self) -> usize {
        (self.position - self.mark_position) + 1
    }

    /// Byte offset of the current token's first character.
    #[must_use]
    pub fn begin_position(&self) -> usize {
        self.begin_position
    }

    /// Byte offset just past the last consumed character.
    #[must_use]
    pub fn end_position(&self) -> usize {
        self.position
    }

    /// Re-initialises all resumable state; configuration is kept.
    pub fn reset(&mut self) {
        self.state_stack.clear();
        self.state_stack.push(ParseState::Root);
        self.state = ParseState::Start;
        self.string_state = StringState::default();
        self.number_state = NumberState::default();
        self.more = true;
        self.done = false;
        self.line = 1;
        self.position = 0;
        self.mark_position = 0;
        self.begin_position = 0;
        self.level = 0;
        self.cp = 0;
        self.cp2 = 0;
        self.source.clear();
        self.scratch.clear();
    }

    /// Verifies that only whitespace remains in the buffer after the root
    /// value.
    ///
    /// # Errors
    ///
    /// Raises `extra_character` (recoverable through the handler) for any
    /// other byte.
    pub fn check_done(&mut self) -> Result<(), ParseError> {
        while let Some(b) = self.source.peek() {
            match b {
                b'\n' | b'\r' | b'\t' | b' ' => self.advance(),
                _ => {
                    self.report::<Infallible>(JsonErrorKind::ExtraCharacter)?;
                    self.advance();
                }
            }
        }
        Ok(())
    }

    /// Drives events into `sink` until the pushed input is exhausted, the
    /// sink rejects, or (in cursor mode) one value event has fired.
    ///
    /// Calling `parse_some` again with no new input signals end of input:
    /// a pending number is finalised, a complete document flushes the sink
    /// and becomes [`done`](Self::done), and anything else raises
    /// `unexpected_eof`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] carrying either the syntax error or the
    /// sink's own error, plus the position of the failure.
    pub fn parse_some<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        if self.state == ParseState::Accept {
            self.flush(sink)?;
            return Ok(());
        }

        if self.source.is_exhausted() && self.more {
            match self.state {
                ParseState::Number => match self.number_state {
                    NumberState::Zero | NumberState::Integer => self.end_integer_value(sink)?,
                    NumberState::Fraction2 | NumberState::Exp3 => self.end_fraction_value(sink)?,
                    _ => return Err(self.fatal(JsonErrorKind::UnexpectedEof)),
                },
                ParseState::Start => {
                    self.more = false;
                    return Err(ParseError::syntax(
                        JsonErrorKind::UnexpectedEof,
                        self.line,
                        self.column(),
                    ));
                }
                ParseState::Done => self.more = false,
                ParseState::Cr => {
                    self.line += 1;
                    self.mark_position = self.position;
                    self.state = self.pop_state();
                }
                _ => return Err(self.fatal(JsonErrorKind::UnexpectedEof)),
            }
        }

        while self.more {
            let Some(b) = self.source.peek() else { break };
            match self.state {
                ParseState::Accept => {
                    self.flush(sink)?;
                }
                ParseState::Cr => {
                    self.line += 1;
                    if b == b'\n' {
                        self.advance();
                    }
                    self.mark_position = self.position;
                    self.state = self.pop_state();
                }
                ParseState::Start => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b'}' => return Err(self.fatal(JsonErrorKind::UnexpectedRbrace)),
                    b']' => return Err(self.fatal(JsonErrorKind::UnexpectedRbracket)),
                    _ => {
                        if !self.begin_value(sink, b)? {
                            return Err(self.fatal(JsonErrorKind::SyntaxError));
                        }
                    }
                },
                ParseState::ExpectCommaOrEnd => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b'}' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.end_object_event(sink)?;
                    }
                    b']' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.end_array_event(sink)?;
                    }
                    b',' => {
                        self.begin_member_or_element()?;
                        self.advance();
                    }
                    _ => {
                        match self.parent() {
                            ParseState::Array => {
                                self.report(JsonErrorKind::ExpectedCommaOrRbracket)?;
                            }
                            ParseState::Object => {
                                self.report(JsonErrorKind::ExpectedCommaOrRbrace)?;
                            }
                            _ => self.report(JsonErrorKind::UnexpectedCharacter)?,
                        }
                        self.advance();
                    }
                },
                ParseState::ExpectMemberNameOrEnd => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b'}' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.end_object_event(sink)?;
                    }
                    b'"' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.push_state(ParseState::MemberName);
                        self.state = ParseState::String;
                        self.string_state = StringState::default();
                        self.scratch.clear();
                        self.parse_string(sink)?;
                    }
                    b'\'' => {
                        self.report(JsonErrorKind::SingleQuote)?;
                        self.advance();
                    }
                    _ => {
                        self.report(JsonErrorKind::ExpectedKey)?;
                        self.advance();
                    }
                },
                ParseState::ExpectMemberName => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b'"' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.push_state(ParseState::MemberName);
                        self.state = ParseState::String;
                        self.string_state = StringState::default();
                        self.scratch.clear();
                        self.parse_string(sink)?;
                    }
                    b'}' => {
                        self.begin_position = self.position;
                        self.advance();
                        if !self.allow_trailing_comma {
                            self.report(JsonErrorKind::ExtraComma)?;
                        }
                        self.end_object_event(sink)?;
                    }
                    b'\'' => {
                        self.report(JsonErrorKind::SingleQuote)?;
                        self.advance();
                    }
                    _ => {
                        self.report(JsonErrorKind::ExpectedKey)?;
                        self.advance();
                    }
                },
                ParseState::ExpectColon => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b':' => {
                        self.state = ParseState::ExpectValue;
                        self.advance();
                    }
                    _ => {
                        self.report(JsonErrorKind::ExpectedColon)?;
                        self.advance();
                    }
                },
                ParseState::ExpectValue => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b']' => {
                        self.begin_position = self.position;
                        self.advance();
                        if self.parent() == ParseState::Array {
                            if !self.allow_trailing_comma {
                                self.report(JsonErrorKind::ExtraComma)?;
                            }
                            self.end_array_event(sink)?;
                        } else {
                            self.report(JsonErrorKind::ExpectedValue)?;
                        }
                    }
                    b'\'' => {
                        self.report(JsonErrorKind::SingleQuote)?;
                        self.advance();
                    }
                    _ => {
                        if !self.begin_value(sink, b)? {
                            self.report(JsonErrorKind::ExpectedValue)?;
                            self.advance();
                        }
                    }
                },
                ParseState::ExpectValueOrEnd => match b {
                    illegal_control!() => {
                        self.report(JsonErrorKind::IllegalControlCharacter)?;
                        self.advance();
                    }
                    b' ' | b'\t' | b'\n' | b'\r' => self.skip_space(),
                    b'/' => {
                        self.advance();
                        self.push_state(self.state);
                        self.state = ParseState::Slash;
                    }
                    b']' => {
                        self.begin_position = self.position;
                        self.advance();
                        self.end_array_event(sink)?;
                    }
                    b'\'' => {
                        self.report(JsonErrorKind::SingleQuote)?;
                        self.advance();
                    }
                    _ => {
                        if !self.begin_value(sink, b)? {
                            self.report(JsonErrorKind::ExpectedValue)?;
                            self.advance();
                        }
                    }
                },
                ParseState::String => self.parse_string(sink)?,
                ParseState::Number => self.parse_number(sink)?,
                ParseState::T => {
                    if b == b'r' {
                        self.advance();
                        self.state = ParseState::Tr;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Tr => {
                    if b == b'u' {
                        self.advance();
                        self.state = ParseState::Tru;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Tru => {
                    if b == b'e' {
                        self.advance();
                        self.emit_bool(sink, true)?;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::F => {
                    if b == b'a' {
                        self.advance();
                        self.state = ParseState::Fa;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Fa => {
                    if b == b'l' {
                        self.advance();
                        self.state = ParseState::Fal;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Fal => {
                    if b == b's' {
                        self.advance();
                        self.state = ParseState::Fals;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Fals => {
                    if b == b'e' {
                        self.advance();
                        self.emit_bool(sink, false)?;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::N => {
                    if b == b'u' {
                        self.advance();
                        self.state = ParseState::Nu;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Nu => {
                    if b == b'l' {
                        self.advance();
                        self.state = ParseState::Nul;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Nul => {
                    if b == b'l' {
                        self.advance();
                        self.emit_null(sink)?;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidValue));
                    }
                }
                ParseState::Slash => {
                    match b {
                        b'*' => {
                            if !self.allow_comments {
                                return Err(self.fail(JsonErrorKind::IllegalComment));
                            }
                            self.report(JsonErrorKind::IllegalComment)?;
                            self.state = ParseState::SlashStar;
                        }
                        b'/' => {
                            if !self.allow_comments {
                                return Err(self.fail(JsonErrorKind::IllegalComment));
                            }
                            self.report(JsonErrorKind::IllegalComment)?;
                            self.state = ParseState::SlashSlash;
                        }
                        _ => self.report(JsonErrorKind::SyntaxError)?,
                    }
                    self.advance();
                }
                ParseState::SlashStar => match b {
                    b'\r' => {
                        self.push_state(ParseState::SlashStar);
                        self.advance();
                        self.state = ParseState::Cr;
                    }
                    b'\n' => {
                        self.advance();
                        self.line += 1;
                        self.mark_position = self.position;
                    }
                    b'*' => {
                        self.advance();
                        self.state = ParseState::SlashStarStar;
                    }
                    _ => self.advance(),
                },
                ParseState::SlashSlash => match b {
                    b'\r' | b'\n' => self.state = self.pop_state(),
                    _ => self.advance(),
                },
                ParseState::SlashStarStar => {
                    if b == b'/' {
                        self.state = self.pop_state();
                    } else {
                        self.state = ParseState::SlashStar;
                    }
                    self.advance();
                }
                ParseState::Done => break,
                ParseState::Root
                | ParseState::Object
                | ParseState::Array
                | ParseState::MemberName => {
                    debug_assert!(false, "container marker states are never dispatched");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Loops [`parse_some`](Self::parse_some) until the parser is
    /// [`finished`](Self::finished).
    ///
    /// # Errors
    ///
    /// Propagates the first [`ParseError`].
    pub fn finish_parse<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        while !self.finished() {
            self.parse_some(sink)?;
        }
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Token helpers
    // --------------------------------------------------------------------------------------------

    fn flush<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        if let Err(err) = sink.flush() {
            self.more = false;
            return Err(ParseError::sink(err, self.line, self.column()));
        }
        self.done = true;
        self.state = ParseState::Done;
        self.more = false;
        Ok(())
    }

    /// Dispatches a value-starting byte. Returns `Ok(false)` if `b` cannot
    /// begin a value.
    fn begin_value<S: EventSink>(
        &mut self,
        sink: &mut S,
        b: u8,
    ) -> Result<bool, ParseError<S::Error>> {
        match b {
            b'{' => {
                self.begin_position = self.position;
                self.advance();
                self.begin_object_event(sink)?;
            }
            b'[' => {
                self.begin_position = self.position;
                self.advance();
                self.begin_array_event(sink)?;
            }
            b'"' => {
                self.begin_position = self.position;
                self.advance();
                self.state = ParseState::String;
                self.string_state = StringState::default();
                self.scratch.clear();
                self.parse_string(sink)?;
            }
            b'-' => {
                self.scratch.clear();
                self.scratch.push(b'-');
                self.begin_position = self.position;
                self.advance();
                self.state = ParseState::Number;
                self.number_state = NumberState::Minus;
                self.parse_number(sink)?;
            }
            b'0' => {
                self.scratch.clear();
                self.scratch.push(b'0');
                self.begin_position = self.position;
                self.advance();
                self.state = ParseState::Number;
                self.number_state = NumberState::Zero;
                self.parse_number(sink)?;
            }
            b'1'..=b'9' => {
                self.scratch.clear();
                self.scratch.push(b);
                self.begin_position = self.position;
                self.advance();
                self.state = ParseState::Number;
                self.number_state = NumberState::Integer;
                self.parse_number(sink)?;
            }
            b'n' => self.parse_null(sink)?,
            b't' => self.parse_true(sink)?,
            b'f' => self.parse_false(sink)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn begin_object_event<S: EventSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<(), ParseError<S::Error>> {
        self.level += 1;
        if self.level > self.max_nesting_depth {
            self.report(JsonErrorKind::MaxNestingDepthExceeded)?;
        }
        self.push_state(ParseState::Object);
        self.state = ParseState::ExpectMemberNameOrEnd;
        let ctx = self.ctx();
        let keep = emit!(self, sink.begin_object(SemanticTag::None, &ctx));
        self.more = keep && !self.cursor_mode;
        Ok(())
    }

    fn end_object_event<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        if self.level < 1 {
            return Err(self.fatal(JsonErrorKind::UnexpectedRbrace));
        }
        self.state = self.pop_state();
        match self.state {
            ParseState::Object => {
                let ctx = self.ctx();
                let keep = emit!(self, sink.end_object(&ctx));
                self.more = keep && !self.cursor_mode;
            }
            ParseState::Array => {
                return Err(self.fatal(JsonErrorKind::ExpectedCommaOrRbracket));
            }
            _ => return Err(self.fatal(JsonErrorKind::UnexpectedRbrace)),
        }
        if self.level == self.mark_level {
            self.more = false;
        }
        self.level -= 1;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        Ok(())
    }

    fn begin_array_event<S: EventSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<(), ParseError<S::Error>> {
        self.level += 1;
        if self.level > self.max_nesting_depth {
            self.report(JsonErrorKind::MaxNestingDepthExceeded)?;
        }
        self.push_state(ParseState::Array);
        self.state = ParseState::ExpectValueOrEnd;
        let ctx = self.ctx();
        let keep = emit!(self, sink.begin_array(SemanticTag::None, &ctx));
        self.more = keep && !self.cursor_mode;
        Ok(())
    }

    fn end_array_event<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        if self.level < 1 {
            return Err(self.fatal(JsonErrorKind::UnexpectedRbracket));
        }
        self.state = self.pop_state();
        match self.state {
            ParseState::Array => {
                let ctx = self.ctx();
                let keep = emit!(self, sink.end_array(&ctx));
                self.more = keep && !self.cursor_mode;
            }
            ParseState::Object => {
                return Err(self.fatal(JsonErrorKind::ExpectedCommaOrRbrace));
            }
            _ => return Err(self.fatal(JsonErrorKind::UnexpectedRbracket)),
        }
        if self.level == self.mark_level {
            self.more = false;
        }
        self.level -= 1;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        Ok(())
    }

    fn parse_true<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        self.begin_position = self.position;
        if self.source.remaining() >= 4 {
            if self.source.window().starts_with(b"true") {
                self.source.bump_n(4);
                self.position += 4;
                self.emit_bool(sink, true)?;
            } else {
                return Err(self.fatal(JsonErrorKind::InvalidValue));
            }
        } else {
            self.advance();
            self.state = ParseState::T;
        }
        Ok(())
    }

    fn parse_false<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        self.begin_position = self.position;
        if self.source.remaining() >= 5 {
            if self.source.window().starts_with(b"false") {
                self.source.bump_n(5);
                self.position += 5;
                self.emit_bool(sink, false)?;
            } else {
                return Err(self.fatal(JsonErrorKind::InvalidValue));
            }
        } else {
            self.advance();
            self.state = ParseState::F;
        }
        Ok(())
    }

    fn parse_null<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        self.begin_position = self.position;
        if self.source.remaining() >= 4 {
            if self.source.window().starts_with(b"null") {
                self.source.bump_n(4);
                self.position += 4;
                self.emit_null(sink)?;
            } else {
                return Err(self.fatal(JsonErrorKind::InvalidValue));
            }
        } else {
            self.advance();
            self.state = ParseState::N;
        }
        Ok(())
    }

    fn emit_bool<S: EventSink>(
        &mut self,
        sink: &mut S,
        value: bool,
    ) -> Result<(), ParseError<S::Error>> {
        let ctx = self.ctx();
        let keep = emit!(self, sink.bool_value(value, SemanticTag::None, &ctx));
        self.more = keep && !self.cursor_mode;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        Ok(())
    }

    fn emit_null<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        let ctx = self.ctx();
        let keep = emit!(self, sink.null_value(SemanticTag::None, &ctx));
        self.more = keep && !self.cursor_mode;
        self.state = if self.level == 0 {
            ParseState::Accept
        } else {
            ParseState::ExpectCommaOrEnd
        };
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Numbers
    // --------------------------------------------------------------------------------------------

    fn parse_number<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        loop {
            match self.number_state {
                NumberState::Minus => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'0' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Zero;
                        }
                        b'1'..=b'9' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Integer;
                        }
                        _ => return Err(self.fatal(JsonErrorKind::InvalidNumber)),
                    }
                }
                NumberState::Zero => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'.' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Fraction1;
                        }
                        b'e' | b'E' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Exp1;
                        }
                        b'0'..=b'9' => return Err(self.fatal(JsonErrorKind::LeadingZero)),
                        _ => return self.end_integer_value(sink),
                    }
                }
                NumberState::Integer => loop {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'0'..=b'9' => {
                            self.scratch.push(b);
                            self.advance();
                        }
                        b'.' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Fraction1;
                            break;
                        }
                        b'e' | b'E' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Exp1;
                            break;
                        }
                        _ => return self.end_integer_value(sink),
                    }
                },
                NumberState::Fraction1 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    if b.is_ascii_digit() {
                        self.scratch.push(b);
                        self.advance();
                        self.number_state = NumberState::Fraction2;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidNumber));
                    }
                }
                NumberState::Fraction2 => loop {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'0'..=b'9' => {
                            self.scratch.push(b);
                            self.advance();
                        }
                        b'e' | b'E' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Exp1;
                            break;
                        }
                        _ => return self.end_fraction_value(sink),
                    }
                },
                NumberState::Exp1 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'+' | b'-' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Exp2;
                        }
                        b'0'..=b'9' => {
                            self.scratch.push(b);
                            self.advance();
                            self.number_state = NumberState::Exp3;
                        }
                        _ => return Err(self.fatal(JsonErrorKind::InvalidNumber)),
                    }
                }
                NumberState::Exp2 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    if b.is_ascii_digit() {
                        self.scratch.push(b);
                        self.advance();
                        self.number_state = NumberState::Exp3;
                    } else {
                        return Err(self.fatal(JsonErrorKind::InvalidNumber));
                    }
                }
                NumberState::Exp3 => loop {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    if b.is_ascii_digit() {
                        self.scratch.push(b);
                        self.advance();
                    } else {
                        return self.end_fraction_value(sink);
                    }
                },
            }
        }
    }

    fn end_integer_value<S: EventSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<(), ParseError<S::Error>> {
        enum Repr {
            Signed(i64),
            Unsigned(u64),
            Big,
        }
        let repr = if self.scratch.first() == Some(&b'-') {
            match num::dec_to_i64(&self.scratch) {
                Some(v) => Repr::Signed(v),
                None => Repr::Big,
            }
        } else {
            match num::dec_to_u64(&self.scratch) {
                Some(v) if v <= i64::MAX as u64 => Repr::Signed(v as i64),
                Some(v) => Repr::Unsigned(v),
                None => Repr::Big,
            }
        };
        let ctx = self.ctx();
        let keep = match repr {
            Repr::Signed(v) => emit!(self, sink.int64_value(v, SemanticTag::None, &ctx)),
            Repr::Unsigned(v) => emit!(self, sink.uint64_value(v, SemanticTag::None, &ctx)),
            Repr::Big => {
                let text = match utf8::validate(&self.scratch) {
                    Ok(t) => t,
                    Err(_) => return Err(self.fail(JsonErrorKind::InvalidNumber)),
                };
                emit!(
                    self,
                    sink.string_value(Text::Scratch(text), SemanticTag::BigInt, &ctx)
                )
            }
        };
        self.more = keep && !self.cursor_mode;
        self.after_value()
    }

    fn end_fraction_value<S: EventSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<(), ParseError<S::Error>> {
        let ctx = self.ctx();
        let text = match utf8::validate(&self.scratch) {
            Ok(t) => t,
            Err(_) => return Err(self.fail(JsonErrorKind::InvalidNumber)),
        };
        let keep = if self.lossless_number {
            emit!(
                self,
                sink.string_value(Text::Scratch(text), SemanticTag::BigDec, &ctx)
            )
        } else {
            match num::decstr_to_double(text) {
                DoubleParse::Value(d) => emit!(self, sink.double_value(d, SemanticTag::None, &ctx)),
                DoubleParse::OutOfRange(d) => {
                    if self.lossless_bignum {
                        emit!(
                            self,
                            sink.string_value(Text::Scratch(text), SemanticTag::BigDec, &ctx)
                        )
                    } else {
                        emit!(self, sink.double_value(d, SemanticTag::None, &ctx))
                    }
                }
                DoubleParse::Invalid => return Err(self.fail(JsonErrorKind::InvalidNumber)),
            }
        };
        self.more = keep && !self.cursor_mode;
        self.after_value()
    }

    // --------------------------------------------------------------------------------------------
    // Strings
    // --------------------------------------------------------------------------------------------

    fn parse_string<S: EventSink>(&mut self, sink: &mut S) -> Result<(), ParseError<S::Error>> {
        loop {
            match self.string_state {
                StringState::Text => {
                    let start = self.source.pos();
                    let window = self.source.window();
                    let mut n = 0;
                    while n < window.len()
                        && !matches!(window[n], 0x00..=0x1f | b'\\' | b'"')
                    {
                        n += 1;
                    }
                    let special = window.get(n).copied();
                    match special {
                        None => {
                            // Buffer exhausted: carry the partial text over
                            // in the scratch buffer.
                            self.position += n;
                            self.source.bump_n(n);
                            self.scratch
                                .extend_from_slice(self.source.slice(start, start + n));
                            return Ok(());
                        }
                        Some(b'"') => {
                            self.position += n + 1;
                            self.source.bump_n(n + 1);
                            if self.scratch.is_empty() {
                                self.end_string_value(
                                    sink,
                                    StrSpan::Input {
                                        start,
                                        end: start + n,
                                    },
                                )?;
                            } else {
                                self.scratch
                                    .extend_from_slice(self.source.slice(start, start + n));
                                self.end_string_value(sink, StrSpan::Scratch)?;
                            }
                            return Ok(());
                        }
                        Some(b'\\') => {
                            self.position += n + 1;
                            self.scratch
                                .extend_from_slice(self.source.slice(start, start + n));
                            self.source.bump_n(n + 1);
                            self.string_state = StringState::Escape;
                        }
                        Some(b'\n' | b'\r' | b'\t') => {
                            self.position += n + 1;
                            self.scratch
                                .extend_from_slice(self.source.slice(start, start + n));
                            self.source.bump_n(n + 1);
                            // Recovery skips the offending character.
                            self.report(JsonErrorKind::IllegalCharacterInString)?;
                        }
                        Some(_) => {
                            self.position += n + 1;
                            self.scratch
                                .extend_from_slice(self.source.slice(start, start + n));
                            self.source.bump_n(n + 1);
                            self.report(JsonErrorKind::IllegalControlCharacter)?;
                        }
                    }
                }
                StringState::Escape => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    match b {
                        b'"' | b'\\' | b'/' => {
                            self.scratch.push(b);
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b'b' => {
                            self.scratch.push(0x08);
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b'f' => {
                            self.scratch.push(0x0c);
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b'n' => {
                            self.scratch.push(b'\n');
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b'r' => {
                            self.scratch.push(b'\r');
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b't' => {
                            self.scratch.push(b'\t');
                            self.advance();
                            self.string_state = StringState::Text;
                        }
                        b'u' => {
                            self.cp = 0;
                            self.advance();
                            self.string_state = StringState::EscapeU1;
                        }
                        _ => return Err(self.fatal(JsonErrorKind::IllegalEscapedCharacter)),
                    }
                }
                StringState::EscapeU1 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp = self.append_to_codepoint(self.cp, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU2;
                }
                StringState::EscapeU2 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp = self.append_to_codepoint(self.cp, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU3;
                }
                StringState::EscapeU3 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp = self.append_to_codepoint(self.cp, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU4;
                }
                StringState::EscapeU4 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp = self.append_to_codepoint(self.cp, b)?;
                    self.advance();
                    if (0xd800..=0xdbff).contains(&self.cp) {
                        self.string_state = StringState::SurrogatePair1;
                    } else {
                        match char::from_u32(self.cp) {
                            Some(ch) => self.push_char(ch),
                            // A lone low surrogate; recovery skips it.
                            None => self.report(JsonErrorKind::IllegalSurrogateValue)?,
                        }
                        self.string_state = StringState::Text;
                    }
                }
                StringState::SurrogatePair1 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    if b == b'\\' {
                        self.cp2 = 0;
                        self.advance();
                        self.string_state = StringState::SurrogatePair2;
                    } else {
                        return Err(self.fatal(JsonErrorKind::ExpectedCodepointSurrogatePair));
                    }
                }
                StringState::SurrogatePair2 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    if b == b'u' {
                        self.advance();
                        self.string_state = StringState::EscapeU5;
                    } else {
                        return Err(self.fatal(JsonErrorKind::ExpectedCodepointSurrogatePair));
                    }
                }
                StringState::EscapeU5 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp2 = self.append_to_codepoint(self.cp2, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU6;
                }
                StringState::EscapeU6 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp2 = self.append_to_codepoint(self.cp2, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU7;
                }
                StringState::EscapeU7 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp2 = self.append_to_codepoint(self.cp2, b)?;
                    self.advance();
                    self.string_state = StringState::EscapeU8;
                }
                StringState::EscapeU8 => {
                    let Some(b) = self.source.peek() else {
                        return Ok(());
                    };
                    self.cp2 = self.append_to_codepoint(self.cp2, b)?;
                    self.advance();
                    let combined = 0x10000 + ((self.cp & 0x3ff) << 10) + (self.cp2 & 0x3ff);
                    if let Some(ch) = char::from_u32(combined) {
                        self.push_char(ch);
                    }
                    self.string_state = StringState::Text;
                }
            }
        }
    }

    fn end_string_value<S: EventSink>(
        &mut self,
        sink: &mut S,
        span: StrSpan,
    ) -> Result<(), ParseError<S::Error>> {
        let bytes: &[u8] = match span {
            StrSpan::Scratch => &self.scratch,
            StrSpan::Input { start, end } => self.source.slice(start, end),
        };
        let text = match utf8::validate(bytes) {
            Ok(t) => t,
            Err((kind, _valid)) => {
                self.report(kind)?;
                // Recovered: drop the malformed string but keep the
                // document structure consistent.
                self.finish_string_state();
                return Ok(());
            }
        };
        let view = match span {
            StrSpan::Scratch => Text::Scratch(text),
            StrSpan::Input { .. } => Text::Input(text),
        };
        match self.parent() {
            ParseState::MemberName => {
                let ctx = self.ctx();
                let keep = emit!(self, sink.key(view, &ctx));
                self.more = keep && !self.cursor_mode;
                self.pop_state();
                self.state = ParseState::ExpectColon;
            }
            ParseState::Object | ParseState::Array | ParseState::Root => {
                let at_root = self.parent() == ParseState::Root;
                let special = self
                    .string_double_map
                    .iter()
                    .find(|(s, _)| s.as_str() == text)
                    .map(|(_, d)| *d);
                let ctx = self.ctx();
                let keep = match special {
                    Some(d) => emit!(self, sink.double_value(d, SemanticTag::None, &ctx)),
                    None => emit!(self, sink.string_value(view, SemanticTag::None, &ctx)),
                };
                self.more = keep && !self.cursor_mode;
                self.state = if at_root {
                    ParseState::Accept
                } else {
                    ParseState::ExpectCommaOrEnd
                };
            }
            _ => self.report(JsonErrorKind::SyntaxError)?,
        }
        Ok(())
    }

    /// Applies the state transitions of a finished string token without
    /// emitting an event. Used when a recovered error swallowed the value.
    fn finish_string_state(&mut self) {
        match self.parent() {
            ParseState::MemberName => {
                self.pop_state();
                self.state = ParseState::ExpectColon;
            }
            ParseState::Root => self.state = ParseState::Accept,
            _ => self.state = ParseState::ExpectCommaOrEnd,
        }
    }

    fn append_to_codepoint<E>(&mut self, cp: u32, b: u8) -> Result<u32, ParseError<E>> {
        let cp = cp << 4;
        let digit = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'a'..=b'f' => u32::from(b - b'a' + 10),
            b'A'..=b'F' => u32::from(b - b'A' + 10),
            _ => {
                self.report(JsonErrorKind::InvalidUnicodeEscapeSequence)?;
                0
            }
        };
        Ok(cp + digit)
    }

    fn push_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.scratch
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    }

    // --------------------------------------------------------------------------------------------
    // Structure bookkeeping
    // --------------------------------------------------------------------------------------------

    fn begin_member_or_element<E>(&mut self) -> Result<(), ParseError<E>> {
        match self.parent() {
            ParseState::Object => {
                self.state = ParseState::ExpectMemberName;
                Ok(())
            }
            ParseState::Array => {
                self.state = ParseState::ExpectValue;
                Ok(())
            }
            ParseState::Root => Ok(()),
            _ => self.report(JsonErrorKind::SyntaxError),
        }
    }

    fn after_value<E>(&mut self) -> Result<(), ParseError<E>> {
        match self.parent() {
            ParseState::Array | ParseState::Object => {
                self.state = ParseState::ExpectCommaOrEnd;
                Ok(())
            }
            ParseState::Root => {
                self.state = ParseState::Accept;
                Ok(())
            }
            _ => self.report(JsonErrorKind::SyntaxError),
        }
    }

    fn parent(&self) -> ParseState {
        *self.state_stack.last().unwrap_or(&ParseState::Root)
    }

    fn push_state(&mut self, state: ParseState) {
        self.state_stack.push(state);
    }

    fn pop_state(&mut self) -> ParseState {
        self.state_stack.pop().unwrap_or(ParseState::Root)
    }

    // --------------------------------------------------------------------------------------------
    // Position and error helpers
    // --------------------------------------------------------------------------------------------

    #[inline]
    fn advance(&mut self) {
        self.source.bump();
        self.position += 1;
    }

    fn skip_space(&mut self) {
        while let Some(b) = self.source.peek() {
            match b {
                b' ' | b'\t' => self.advance(),
                b'\n' => {
                    self.advance();
                    self.line += 1;
                    self.mark_position = self.position;
                }
                b'\r' => {
                    self.advance();
                    if self.source.peek().is_some() {
                        self.line += 1;
                        if self.source.peek() == Some(b'\n') {
                            self.advance();
                        }
                        self.mark_position = self.position;
                    } else {
                        // The line break may continue with `\n` in the next
                        // chunk; suspend and settle on resumption.
                        self.push_state(self.state);
                        self.state = ParseState::Cr;
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn ctx(&self) -> SerContext {
        SerContext::new(self.line, self.column(), self.begin_position, self.position)
    }

    /// Offers `kind` to the recovery handler; `Ok(())` means skip and
    /// resume.
    fn report<E>(&mut self, kind: JsonErrorKind) -> Result<(), ParseError<E>> {
        let ctx = self.ctx();
        if (self.err_handler)(kind, &ctx) {
            Ok(())
        } else {
            Err(self.fail(kind))
        }
    }

    /// Stops the parser with `kind` without consulting the handler.
    fn fail<E>(&mut self, kind: JsonErrorKind) -> ParseError<E> {
        self.more = false;
        ParseError::syntax(kind, self.line, self.column())
    }

    /// Notifies the handler, then stops regardless of its answer. Used for
    /// structural mismatches that prevent continuation.
    fn fatal<E>(&mut self, kind: JsonErrorKind) -> ParseError<E> {
        let ctx = self.ctx();
        let _ = (self.err_handler)(kind, &ctx);
        self.fail(kind)
    }
}
