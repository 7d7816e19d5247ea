//! Tokenizer for WML.
//!
//! The tokenizer converts source text into a flat stream of tokens. It has
//! two lexical modes: contents mode (text between tags) and tag mode (inside
//! `<Tag ...>`). The first lexical error halts tokenization.

use tracing::debug;
use wml_foundation::{Error, Result, Span};

use crate::expression::scan_braced;
use crate::token::{Token, TokenKind};

/// Lexical mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Between tags: whitespace, text, comments, tag openings and closings.
    Contents,
    /// Inside an opening tag: properties, values, `>` and `/>`.
    Tag,
}

/// Tokenizer for WML source.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Current lexical mode.
    mode: Mode,
    /// Set after `name=`: the next token must be a value.
    expect_value: bool,
    /// Span of the most recent `TagOpenBegin`, for unterminated-tag errors.
    open_tag: Span,
    /// Start of an unterminated construct nested inside the current token.
    error_at: Option<(usize, u32, u32)>,
    /// Set once an error token has been produced.
    failed: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            mode: Mode::Contents,
            expect_value: false,
            open_tag: Span::at_start(),
            error_at: None,
            failed: false,
        }
    }

    /// Returns the next token, or `None` at end of input or after an error.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.failed {
            return None;
        }

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        if self.rest.is_empty() {
            if self.mode == Mode::Tag {
                self.failed = true;
                return Some(Token::new(
                    TokenKind::Error("unexpected end of input inside tag".into()),
                    self.open_tag,
                ));
            }
            return None;
        }

        let kind = match self.mode {
            Mode::Contents => self.scan_contents(),
            Mode::Tag => self.scan_tag(),
        };

        let span = Span::new(start, self.position, start_line, start_column);
        let span = match &kind {
            // Errors about unterminated constructs point at their opening
            TokenKind::Error(_) => {
                self.failed = true;
                let (at, line, column) =
                    self.error_at
                        .take()
                        .unwrap_or((start, start_line, start_column));
                let end = self.position.max(at + 1).min(self.source.len());
                Span::new(at, end, line, column)
            }
            TokenKind::TagOpenBegin(_) => {
                self.open_tag = span;
                span
            }
            _ => span,
        };

        Some(Token::new(kind, span))
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// If tokenization fails, the last token is a [`TokenKind::Error`].
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks at the character after the next one.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Advances until the byte offset `target` is reached.
    fn advance_to(&mut self, target: usize) {
        while self.position < target && !self.rest.is_empty() {
            self.advance();
        }
    }

    // =========================================================================
    // Contents mode
    // =========================================================================

    fn scan_contents(&mut self) -> TokenKind {
        match self.peek_char() {
            Some(c) if c.is_whitespace() => self.scan_whitespace(),
            Some('/') if self.at_comment() => self.scan_comment(),
            Some('<') if self.peek_char_n(1) == Some('/') => self.scan_tag_close(),
            Some('<') => self.scan_tag_open(),
            Some('>') => {
                self.advance();
                TokenKind::Error("unexpected '>' in text (escape it as '\\>')".into())
            }
            _ => self.scan_description(),
        }
    }

    /// Returns true if the remaining source starts a comment.
    fn at_comment(&self) -> bool {
        self.rest.starts_with("//") || self.rest.starts_with("/*")
    }

    fn scan_whitespace(&mut self) -> TokenKind {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
        TokenKind::Whitespace
    }

    /// Scans `// ...` to end of line or `/* ... */`.
    fn scan_comment(&mut self) -> TokenKind {
        if self.rest.starts_with("//") {
            let end = self.rest.find('\n').unwrap_or(self.rest.len());
            self.advance_to(self.position + end);
            return TokenKind::Comment;
        }
        match self.rest[2..].find("*/") {
            Some(end) => {
                self.advance_to(self.position + 2 + end + 2);
                TokenKind::Comment
            }
            None => {
                self.advance();
                TokenKind::Error("unterminated block comment".into())
            }
        }
    }

    /// Scans `<Tag` and switches to tag mode.
    fn scan_tag_open(&mut self) -> TokenKind {
        self.advance(); // consume '<'
        let name = self.scan_tag_name();
        if name.is_empty() {
            return TokenKind::Error("expected tag name after '<'".into());
        }
        self.mode = Mode::Tag;
        self.expect_value = false;
        TokenKind::TagOpenBegin(name)
    }

    /// Scans `</Tag>`.
    fn scan_tag_close(&mut self) -> TokenKind {
        self.advance(); // consume '<'
        self.advance(); // consume '/'
        let name = self.scan_tag_name();
        if name.is_empty() {
            return TokenKind::Error("expected tag name after '</'".into());
        }
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
        if self.peek_char() == Some('>') {
            self.advance();
            TokenKind::TagClose(name)
        } else {
            TokenKind::Error(format!("expected '>' to close '</{name}'"))
        }
    }

    /// Scans a tag name: `[A-Za-z][A-Za-z0-9]*`.
    fn scan_tag_name(&mut self) -> String {
        let start = self.position;
        if self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric()) {
                self.advance();
            }
        }
        self.source[start..self.position].to_string()
    }

    /// Scans free text up to the next `<`, `>`, whitespace, or comment marker.
    fn scan_description(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            match c {
                '<' | '>' => break,
                c if c.is_whitespace() => break,
                '/' if self.at_comment() => break,
                '\\' => {
                    self.advance();
                    match self.peek_char() {
                        Some(escaped) => {
                            text.push(escaped);
                            self.advance();
                        }
                        None => return TokenKind::Error("dangling escape at end of input".into()),
                    }
                }
                c => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        TokenKind::Description(text)
    }

    // =========================================================================
    // Tag mode
    // =========================================================================

    fn scan_tag(&mut self) -> TokenKind {
        let Some(c) = self.peek_char() else {
            return TokenKind::Error("unexpected end of input inside tag".into());
        };

        if self.expect_value {
            self.expect_value = false;
            return match c {
                '(' => self.scan_key_value(),
                '"' => self.scan_literal_value(),
                '{' => self.scan_expression_value(),
                _ => {
                    self.advance();
                    TokenKind::Error("expected '(', '\"' or '{' after '='".into())
                }
            };
        }

        match c {
            c if c.is_whitespace() => self.scan_whitespace(),
            '/' if self.at_comment() => self.scan_comment(),
            '/' if self.peek_char_n(1) == Some('>') => {
                self.advance();
                self.advance();
                self.mode = Mode::Contents;
                TokenKind::TagOpenEnd { self_closing: true }
            }
            '>' => {
                self.advance();
                self.mode = Mode::Contents;
                TokenKind::TagOpenEnd {
                    self_closing: false,
                }
            }
            '!' => {
                self.advance();
                let key = self.scan_identifier();
                if key.is_empty() {
                    TokenKind::Error("expected property name after '!'".into())
                } else {
                    TokenKind::Property {
                        key,
                        is_boolean: true,
                        value: false,
                    }
                }
            }
            '(' => self.scan_key_value(),
            '"' => self.scan_literal_value(),
            '{' => self.scan_expression_value(),
            c if is_identifier_start(c) => {
                let key = self.scan_identifier();
                if self.peek_char() == Some('=') {
                    self.advance();
                    self.expect_value = true;
                    TokenKind::Property {
                        key,
                        is_boolean: false,
                        value: false,
                    }
                } else {
                    TokenKind::Property {
                        key,
                        is_boolean: true,
                        value: true,
                    }
                }
            }
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character in tag: {c}"))
            }
        }
    }

    /// Scans an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    fn scan_identifier(&mut self) -> String {
        let start = self.position;
        if self.peek_char().is_some_and(is_identifier_start) {
            while self.peek_char().is_some_and(is_identifier_char) {
                self.advance();
            }
        }
        self.source[start..self.position].to_string()
    }

    /// Scans `(identifier)`.
    fn scan_key_value(&mut self) -> TokenKind {
        self.advance(); // consume '('
        let key = self.scan_identifier();
        match self.peek_char() {
            Some(')') if !key.is_empty() => {
                self.advance();
                TokenKind::KeyValue(key)
            }
            Some(c) if c.is_whitespace() => {
                TokenKind::Error("whitespace is not allowed inside a key value".into())
            }
            Some(')') | None => TokenKind::Error("expected identifier in key value".into()),
            Some(c) => TokenKind::Error(format!("illegal character in key value: {c}")),
        }
    }

    /// Scans a double-quoted literal with backslash escapes.
    fn scan_literal_value(&mut self) -> TokenKind {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    return TokenKind::LiteralValue(text);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(c) => {
                            text.push(c);
                            self.advance();
                        }
                        None => return TokenKind::Error("unterminated literal value".into()),
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => return TokenKind::Error("unterminated literal value".into()),
            }
        }
    }

    /// Scans a `{...}` expression, balancing nested braces.
    fn scan_expression_value(&mut self) -> TokenKind {
        let open = self.position;
        match scan_braced(self.source, open) {
            Ok(end) => {
                let inner = self.source[open + 1..end - 1].to_string();
                self.advance_to(end);
                TokenKind::ExpressionValue(inner)
            }
            Err(err) => {
                self.advance_to(err.offset);
                self.error_at = Some((self.position, self.line, self.column));
                self.advance();
                TokenKind::Error(err.message.to_string())
            }
        }
    }
}

/// Returns true if `c` can start a property name or key.
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true if `c` can appear in a property name or key.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenizes WML source.
///
/// # Errors
/// Returns the first lexical error; no partial token stream is produced.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Lexer::tokenize_all(source);
    if let Some(Token {
        kind: TokenKind::Error(message),
        span,
    }) = tokens.last()
    {
        return Err(Error::lexical(message.clone(), *span));
    }
    tokens.shrink_to_fit();
    debug!(tokens = tokens.len(), bytes = source.len(), "tokenized source");
    Ok(tokens)
}
