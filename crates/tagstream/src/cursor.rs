//! Pull-style event reading on top of the parser's cursor mode.

use crate::error::ParseError;
use crate::event::{EventCapture, ParseEvent};
use crate::options::ParseOptions;
use crate::parser::JsonParser;

/// A pull-style event reader.
///
/// Wraps a [`JsonParser`] in cursor mode: the parser suspends after every
/// event, and [`next_event`](Self::next_event) hands events to the caller
/// one at a time. Feed input with [`update`](Self::update) and signal end of
/// input with [`finish`](Self::finish); before `finish`, exhausting the
/// buffered input yields `Ok(None)` rather than an error.
///
/// # Examples
///
/// ```rust
/// use tagstream::{EventCursor, ParseEvent, ParseOptions, SemanticTag};
///
/// let mut cursor = EventCursor::from_slice(b"[10]", ParseOptions::default());
/// assert!(matches!(
///     cursor.next_event().unwrap(),
///     Some(ParseEvent::BeginArray { .. })
/// ));
/// assert_eq!(
///     cursor.next_event().unwrap(),
///     Some(ParseEvent::Int64 {
///         value: 10,
///         tag: SemanticTag::None
///     })
/// );
/// assert_eq!(cursor.next_event().unwrap(), Some(ParseEvent::EndArray));
/// assert_eq!(cursor.next_event().unwrap(), None);
/// ```
pub struct EventCursor {
    parser: JsonParser,
    capture: EventCapture,
    end_of_input: bool,
}

impl EventCursor {
    /// Creates a cursor awaiting input.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        let mut parser = JsonParser::new(options);
        parser.cursor_mode(true);
        Self {
            parser,
            capture: EventCapture::new(),
            end_of_input: false,
        }
    }

    /// Creates a cursor over a complete document.
    #[must_use]
    pub fn from_slice(data: &[u8], options: ParseOptions) -> Self {
        let mut cursor = Self::new(options);
        cursor.update(data);
        cursor.finish();
        cursor
    }

    /// Pushes a chunk of input.
    pub fn update(&mut self, data: &[u8]) {
        self.parser.update(data);
    }

    /// Marks the end of input. After this, an incomplete document raises
    /// `unexpected_eof` instead of yielding `Ok(None)`.
    pub fn finish(&mut self) {
        self.end_of_input = true;
    }

    /// Returns `true` once the root value and trailing flush have been
    /// consumed.
    #[must_use]
    pub fn done(&self) -> bool {
        self.parser.done()
    }

    /// Verifies that only whitespace follows the root value.
    ///
    /// # Errors
    ///
    /// Raises `extra_character` for any other trailing byte.
    pub fn check_done(&mut self) -> Result<(), ParseError> {
        self.parser.check_done()
    }

    /// Advances to the next event.
    ///
    /// Returns `Ok(None)` when the document is complete, or when more input
    /// is needed and [`finish`](Self::finish) has not been called.
    ///
    /// # Errors
    ///
    /// Propagates parse errors, including `unexpected_eof` for a document
    /// that is still open at end of input.
    pub fn next_event(&mut self) -> Result<Option<ParseEvent>, ParseError> {
        loop {
            if let Some((event, _ctx)) = self.capture.pop() {
                return Ok(Some(event));
            }
            if self.parser.done() {
                return Ok(None);
            }
            if self.parser.source_exhausted() && !self.parser.accepted() && !self.end_of_input {
                return Ok(None);
            }
            self.parser.restart();
            self.parser.parse_some(&mut self.capture)?;
        }
    }
}
