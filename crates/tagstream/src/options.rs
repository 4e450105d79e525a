//! Configuration for the JSON parser.

use alloc::string::String;

/// Configuration options for [`JsonParser`](crate::JsonParser).
///
/// All relaxations are off by default; the default configuration parses
/// strict RFC 8259 JSON.
///
/// # Examples
///
/// ```rust
/// use tagstream::{JsonParser, ParseOptions};
///
/// let parser = JsonParser::new(ParseOptions {
///     allow_comments: true,
///     allow_trailing_comma: true,
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum container nesting depth. Exceeding it raises
    /// `max_nesting_depth_exceeded`.
    ///
    /// # Default
    ///
    /// `1024`
    pub max_nesting_depth: usize,

    /// Whether a comma before a closing `}` or `]` is accepted.
    ///
    /// When `false`, a trailing comma raises `extra_comma` (recoverable
    /// through the error handler).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_trailing_comma: bool,

    /// Whether `//` line comments and `/* */` block comments are accepted
    /// between tokens.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_comments: bool,

    /// Emit every fractional or exponential number as a `bigdec`-tagged
    /// string instead of converting to a double, preserving the source text
    /// exactly.
    ///
    /// # Default
    ///
    /// `false`
    pub lossless_number: bool,

    /// When a fractional number overflows the finite double range, emit it
    /// as a `bigdec`-tagged string instead of an infinity.
    ///
    /// # Default
    ///
    /// `false`
    pub lossless_bignum: bool,

    /// A string literal mapped to NaN when it appears as a value (never as
    /// an object key).
    ///
    /// # Default
    ///
    /// `None`
    pub nan_literal: Option<String>,

    /// A string literal mapped to positive infinity when it appears as a
    /// value.
    ///
    /// # Default
    ///
    /// `None`
    pub inf_literal: Option<String>,

    /// A string literal mapped to negative infinity when it appears as a
    /// value.
    ///
    /// # Default
    ///
    /// `None`
    pub neg_inf_literal: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 1024,
            allow_trailing_comma: false,
            allow_comments: false,
            lossless_number: false,
            lossless_bignum: false,
            nan_literal: None,
            inf_literal: None,
            neg_inf_literal: None,
        }
    }
}
