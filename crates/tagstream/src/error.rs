//! Error types surfaced by the JSON parser.

use core::convert::Infallible;

use thiserror::Error;

/// The JSON parser's error taxonomy.
///
/// Each kind is first offered to the parser's recovery handler; a handler
/// returning `true` makes the parser skip the offending input and resume,
/// except for structural mismatches that prevent continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum JsonErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("syntax error")]
    SyntaxError,
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid number")]
    InvalidNumber,
    #[error("leading zero in number")]
    LeadingZero,
    #[error("extra comma")]
    ExtraComma,
    #[error("expected a value")]
    ExpectedValue,
    #[error("expected an object member key")]
    ExpectedKey,
    #[error("expected ':'")]
    ExpectedColon,
    #[error("expected ',' or ']'")]
    ExpectedCommaOrRbracket,
    #[error("expected ',' or '}}'")]
    ExpectedCommaOrRbrace,
    #[error("unexpected ']'")]
    UnexpectedRbracket,
    #[error("unexpected '}}'")]
    UnexpectedRbrace,
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("single quoted string")]
    SingleQuote,
    #[error("illegal control character")]
    IllegalControlCharacter,
    #[error("illegal character in string")]
    IllegalCharacterInString,
    #[error("comments are not allowed")]
    IllegalComment,
    #[error("illegal escaped character")]
    IllegalEscapedCharacter,
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscapeSequence,
    #[error("expected codepoint surrogate pair")]
    ExpectedCodepointSurrogatePair,
    #[error("over-long UTF-8 sequence")]
    OverLongUtf8Sequence,
    #[error("unpaired high surrogate")]
    UnpairedHighSurrogate,
    #[error("expected UTF-8 continuation byte")]
    ExpectedContinuationByte,
    #[error("illegal surrogate value")]
    IllegalSurrogateValue,
    #[error("illegal codepoint")]
    IllegalCodepoint,
    #[error("maximum nesting depth exceeded")]
    MaxNestingDepthExceeded,
    #[error("extra character after root value")]
    ExtraCharacter,
}

/// What terminated the parse: a rejecting sink or a syntax error.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ErrorSource<E> {
    #[error("sink error: {0}")]
    Sink(E),
    #[error("{0}")]
    Syntax(#[from] JsonErrorKind),
}

/// A parse failure, carrying the error source plus the line and column
/// observed at the moment of failure.
///
/// The sink error type `E` defaults to [`Infallible`] for sinks that cannot
/// fail, such as [`TreeDecoder`](crate::TreeDecoder) and
/// [`EventCapture`](crate::EventCapture).
#[derive(Debug, PartialEq, Eq, Error)]
#[error("{source} at {line}:{column}")]
pub struct ParseError<E = Infallible> {
    source: ErrorSource<E>,
    line: usize,
    column: usize,
}

impl<E> ParseError<E> {
    pub(crate) fn syntax(kind: JsonErrorKind, line: usize, column: usize) -> Self {
        Self {
            source: ErrorSource::Syntax(kind),
            line,
            column,
        }
    }

    pub(crate) fn sink(error: E, line: usize, column: usize) -> Self {
        Self {
            source: ErrorSource::Sink(error),
            line,
            column,
        }
    }

    /// The source of the failure.
    #[must_use]
    pub fn source(&self) -> &ErrorSource<E> {
        &self.source
    }

    /// The syntax error kind, if the failure was not a sink error.
    #[must_use]
    pub fn kind(&self) -> Option<JsonErrorKind> {
        match self.source {
            ErrorSource::Syntax(kind) => Some(kind),
            ErrorSource::Sink(_) => None,
        }
    }

    /// 1-based line at the moment of failure.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column at the moment of failure.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}
