//! Error types for the WML front end.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! phase is fail-fast: the first error halts the phase and is the only one
//! surfaced.

use std::fmt;

use thiserror::Error;

use crate::span::{Span, TokenRange};

/// The main error type for WML operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a lexical error (tokenizer).
    #[must_use]
    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Lexical {
            message: message.into(),
            span,
        })
    }

    /// Creates a syntactic error (parser).
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span, tokens: TokenRange) -> Self {
        Self::new(ErrorKind::Syntax {
            message: message.into(),
            span,
            tokens,
        })
    }

    /// Creates a semantic error (schema builder).
    #[must_use]
    pub fn semantic(message: impl Into<String>, span: Span, tokens: TokenRange) -> Self {
        Self::new(ErrorKind::Semantic {
            message: message.into(),
            span,
            tokens,
        })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the source span this error highlights, if any.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match &self.kind {
            ErrorKind::Lexical { span, .. }
            | ErrorKind::Syntax { span, .. }
            | ErrorKind::Semantic { span, .. } => Some(*span),
            ErrorKind::Internal(_) => None,
        }
    }

    /// Returns the token range this error cites, if any.
    #[must_use]
    pub const fn tokens(&self) -> Option<TokenRange> {
        match &self.kind {
            ErrorKind::Syntax { tokens, .. } | ErrorKind::Semantic { tokens, .. } => Some(*tokens),
            ErrorKind::Lexical { .. } | ErrorKind::Internal(_) => None,
        }
    }

    /// Returns the bare message without position information.
    #[must_use]
    pub fn message(&self) -> &str {
        match &self.kind {
            ErrorKind::Lexical { message, .. }
            | ErrorKind::Syntax { message, .. }
            | ErrorKind::Semantic { message, .. }
            | ErrorKind::Internal(message) => message,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Unterminated literal, comment or template, or an unexpected character.
    #[error("lexical error at {}:{}: {message}", .span.line, .span.column)]
    Lexical {
        /// Description of the error.
        message: String,
        /// Offending source range. For unterminated constructs this starts
        /// at the opening delimiter.
        span: Span,
    },

    /// Unmatched tag close, illegal property, unknown child tag, missing
    /// required property.
    #[error("syntax error at {}:{}: {message}", .span.line, .span.column)]
    Syntax {
        /// Description of the error.
        message: String,
        /// Source range covered by the offending tokens.
        span: Span,
        /// The offending tokens.
        tokens: TokenRange,
    },

    /// Dangling `Else`, unresolved Exit endpoint, dangling cross-reference.
    #[error("semantic error at {}:{}: {message}", .span.line, .span.column)]
    Semantic {
        /// Description of the error.
        message: String,
        /// Source range covered by the originating parse node.
        span: Span,
        /// The originating parse node's tokens.
        tokens: TokenRange,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or asset name.
    pub source: Option<String>,
    /// The source line where the error occurred.
    pub line_text: Option<String>,
    /// Chain of enclosing tags, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records the text of the offending source line.
    #[must_use]
    pub fn with_line_text(mut self, line: impl Into<String>) -> Self {
        self.line_text = Some(line.into());
        self
    }

    /// Adds an enclosing tag frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }

    /// Builds context for `span` by extracting its line from `source`.
    #[must_use]
    pub fn for_span(source: &str, span: Span) -> Self {
        let start = span.start.min(source.len());
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[start..]
            .find('\n')
            .map_or(source.len(), |i| start + i);
        Self::new().with_line_text(&source[line_start..line_end])
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        if let Some(line) = &self.line_text {
            write!(f, "\n  | {line}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  inside <{frame}>")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for WML operations.
pub type Result<T> = std::result::Result<T, Error>;
