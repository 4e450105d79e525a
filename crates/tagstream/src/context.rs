//! Read-only position information surfaced with every event.

/// A snapshot of the producer's position at the moment an event is emitted.
///
/// `line` and `column` are 1-based. `begin_position` is the byte offset of
/// the current token's first character; `end_position` is the offset just
/// past the most recently consumed character. For `}` and `]` events,
/// `begin_position` points at the closing bracket itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerContext {
    line: usize,
    column: usize,
    begin_position: usize,
    end_position: usize,
}

impl SerContext {
    pub(crate) fn new(
        line: usize,
        column: usize,
        begin_position: usize,
        end_position: usize,
    ) -> Self {
        Self {
            line,
            column,
            begin_position,
            end_position,
        }
    }

    /// 1-based line of the current token.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the current token.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset of the current token's first character.
    #[must_use]
    pub fn begin_position(&self) -> usize {
        self.begin_position
    }

    /// Byte offset just past the most recently consumed character.
    #[must_use]
    pub fn end_position(&self) -> usize {
        self.end_position
    }

    /// Alias for [`begin_position`](Self::begin_position).
    #[must_use]
    pub fn position(&self) -> usize {
        self.begin_position
    }
}
