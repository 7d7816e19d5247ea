//! Source location tracking.
//!
//! [`Span`] tracks byte ranges of tokens in WML source for error reporting.
//! [`TokenRange`] indexes into a token sequence, which is the authoritative
//! source map used by later phases.

/// A span of source text.
///
/// Tracks byte offsets and line/column positions for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Creates a span at the start of input.
    #[must_use]
    pub const fn at_start() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }

    /// Creates a span covering the range from this span to another.
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the text this span covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// An inclusive range of token indices.
///
/// Parse nodes record the index of their opening `TagOpenBegin` token and of
/// the token that finished them (`TagOpenEnd` for self-closing tags,
/// `TagClose` otherwise). Trivial nodes lifted from a single token have
/// `start == end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenRange {
    /// Index of the first token.
    pub start: usize,
    /// Index of the last token (inclusive).
    pub end: usize,
}

impl TokenRange {
    /// Creates a new token range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A range covering exactly one token.
    #[must_use]
    pub const fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }
}
