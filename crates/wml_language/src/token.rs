//! Token types for WML.
//!
//! Tokens are the output of the tokenizer and input to the parser. The token
//! sequence covers every byte of the source exactly once, so it doubles as the
//! source map later phases use for offset reporting.

use wml_foundation::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// Token types for WML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Tag structure
    /// `<Tag`: switches the tokenizer into tag mode.
    TagOpenBegin(String),
    /// `>` or `/>`: switches back to contents mode.
    TagOpenEnd {
        /// True for `/>`.
        self_closing: bool,
    },
    /// `</Tag>`
    TagClose(String),

    // Tag mode
    /// A property name. Boolean properties carry their value (`name` is true,
    /// `!name` is false); `name=` is non-boolean and is followed by a value.
    Property {
        /// The property name.
        key: String,
        /// True for a bare (or `!`-prefixed) property.
        is_boolean: bool,
        /// The boolean value; meaningless for non-boolean properties.
        value: bool,
    },
    /// `(identifier)`
    KeyValue(String),
    /// `"literal"` with escapes resolved.
    LiteralValue(String),
    /// `{expression}` with the braces stripped.
    ExpressionValue(String),

    // Either mode
    /// A run of whitespace.
    Whitespace,
    /// `// line` or `/* block */`.
    Comment,

    // Contents mode
    /// A run of bare text with escapes resolved.
    Description(String),

    /// Lexer error.
    Error(String),
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TagOpenBegin(_) => "tag opening",
            Self::TagOpenEnd { self_closing: true } => "'/>'",
            Self::TagOpenEnd { self_closing: false } => "'>'",
            Self::TagClose(_) => "closing tag",
            Self::Property { .. } => "property",
            Self::KeyValue(_) => "key value",
            Self::LiteralValue(_) => "literal value",
            Self::ExpressionValue(_) => "expression value",
            Self::Whitespace => "whitespace",
            Self::Comment => "comment",
            Self::Description(_) => "text",
            Self::Error(_) => "error",
        }
    }
}
