use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::{
    EventCapture, EventSink, JsonParser, ParseError, ParseEvent, ParseOptions, SemanticTag,
    SerContext, Text,
};

/// Parses a complete document, returning events with their contexts.
pub(crate) fn events_with_ctx(
    input: &str,
    options: ParseOptions,
) -> Vec<(ParseEvent, SerContext)> {
    let mut parser = JsonParser::new(options);
    let mut capture = EventCapture::new();
    parser.update(input.as_bytes());
    parser.finish_parse(&mut capture).unwrap();
    capture.into_events()
}

/// Parses a complete document with default options, returning events.
pub(crate) fn events(input: &str) -> Vec<ParseEvent> {
    events_of(input, ParseOptions::default())
}

pub(crate) fn events_of(input: &str, options: ParseOptions) -> Vec<ParseEvent> {
    events_with_ctx(input, options)
        .into_iter()
        .map(|(event, _)| event)
        .collect()
}

/// Parses the document fed in the given chunks, calling `parse_some` after
/// every chunk.
pub(crate) fn events_chunked(chunks: &[&[u8]], options: ParseOptions) -> Vec<ParseEvent> {
    let mut parser = JsonParser::new(options);
    let mut capture = EventCapture::new();
    for chunk in chunks {
        parser.update(chunk);
        parser.parse_some(&mut capture).unwrap();
    }
    parser.finish_parse(&mut capture).unwrap();
    capture
        .into_events()
        .into_iter()
        .map(|(event, _)| event)
        .collect()
}

/// Parses expecting failure, returning the error.
pub(crate) fn parse_err(input: &str, options: ParseOptions) -> ParseError {
    let mut parser = JsonParser::new(options);
    let mut capture = EventCapture::new();
    parser.update(input.as_bytes());
    let result = parser
        .finish_parse(&mut capture)
        .and_then(|()| parser.check_done());
    result.unwrap_err()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TestSinkError;

impl fmt::Display for TestSinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("test sink error")
    }
}

impl core::error::Error for TestSinkError {}

/// A sink for exercising the contract itself: records string payload
/// provenance and can decline or fail at a chosen event ordinal.
#[derive(Debug, Default)]
pub(crate) struct TestSink {
    /// `(text, was_scratch)` per string event.
    pub texts: Vec<(String, bool)>,
    pub keys: Vec<String>,
    pub events_seen: usize,
    /// Return `Ok(false)` from the event with this ordinal (0-based).
    pub stop_at: Option<usize>,
    /// Return `Err` from the event with this ordinal (0-based).
    pub fail_at: Option<usize>,
}

impl TestSink {
    fn step(&mut self) -> Result<bool, TestSinkError> {
        let ordinal = self.events_seen;
        self.events_seen += 1;
        if self.fail_at == Some(ordinal) {
            return Err(TestSinkError);
        }
        Ok(self.stop_at != Some(ordinal))
    }
}

impl EventSink for TestSink {
    type Error = TestSinkError;

    fn begin_object(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn end_object(&mut self, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn begin_array(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn end_array(&mut self, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn key(&mut self, name: Text<'_>, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.keys.push(name.as_str().into());
        self.step()
    }

    fn string_value(
        &mut self,
        value: Text<'_>,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        let scratch = matches!(value, Text::Scratch(_));
        self.texts.push((value.as_str().into(), scratch));
        self.step()
    }

    fn byte_string_value(
        &mut self,
        _value: &[u8],
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn int64_value(
        &mut self,
        _value: i64,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn uint64_value(
        &mut self,
        _value: u64,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn double_value(
        &mut self,
        _value: f64,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn half_value(
        &mut self,
        _value: u16,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn bool_value(
        &mut self,
        _value: bool,
        _tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn null_value(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, TestSinkError> {
        self.step()
    }

    fn flush(&mut self) -> Result<(), TestSinkError> {
        Ok(())
    }
}
