//! Embedded expression scanning.
//!
//! WML embeds JavaScript-like expressions in `{...}` property values. The
//! tokenizer only needs to find the matching close brace, which means
//! balancing nested braces while skipping string literals, comments and
//! template literals (whose `${...}` interpolations recurse into the same
//! scanner). [`ExpressionLexer`] goes one step further and produces a flat
//! token stream for the schema builder's free-variable extraction.

/// A failed expression scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    /// Description of the failure.
    pub message: &'static str,
    /// Byte offset of the opening delimiter of the unterminated construct.
    pub offset: usize,
}

impl ScanError {
    const fn new(message: &'static str, offset: usize) -> Self {
        Self { message, offset }
    }
}

/// Scans a brace-delimited expression starting at `open`.
///
/// `source[open]` must be `{`. Returns the byte offset just past the matching
/// `}`.
///
/// # Errors
/// Returns a [`ScanError`] positioned at the opening delimiter of the first
/// unterminated string, template, comment or brace.
pub fn scan_braced(source: &str, open: usize) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            quote @ (b'\'' | b'"') => i = skip_string(bytes, i, quote)?,
            b'`' => i = skip_template(source, i)?,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..]
                    .find("*/")
                    .ok_or(ScanError::new("unterminated comment in expression", i))?;
                i = i + 2 + end + 2;
            }
            _ => i += 1,
        }
    }
    Err(ScanError::new("unterminated expression", open))
}

/// Skips a single- or double-quoted string starting at `start`.
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> Result<usize, ScanError> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(ScanError::new("unterminated string literal", start))
}

/// Skips a template literal starting at `start`, recursing into `${...}`.
fn skip_template(source: &str, start: usize) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Ok(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => i = scan_braced(source, i + 1)?,
            _ => i += 1,
        }
    }
    Err(ScanError::new("unterminated template literal", start))
}

// =============================================================================
// Expression tokens
// =============================================================================

/// A coarse token of an embedded expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprToken {
    /// An identifier or keyword.
    Ident(String),
    /// An opening bracket: `(`, `[`, `{`, or a template's `${`.
    Open(char),
    /// A closing bracket: `)`, `]` or `}`.
    Close(char),
    /// An operator or separator such as `.`, `?.`, `=>`, `,`, `:`.
    Punct(&'static str),
    /// A number, string, or template text chunk.
    Literal,
}

impl ExprToken {
    /// Returns true if this token is the punctuation `p`.
    #[must_use]
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(self, Self::Punct(q) if *q == p)
    }
}

/// Multi-character punctuation, longest first.
const PUNCTUATION: &[&str] = &[
    "===", "!==", "...", "**=", "&&=", "||=", "??=", "=>", "?.", "==", "!=", "<=", ">=", "&&",
    "||", "??", "++", "--", "+=", "-=", "*=", "/=", "%=", "**", ".", ",", ";", ":", "?", "=", "+",
    "-", "*", "/", "%", "!", "<", ">", "&", "|", "^", "~", "@", "#",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Brace,
    Interpolation,
}

/// Lexer producing [`ExprToken`]s from expression source (braces excluded).
///
/// The lexer is total: malformed input ends the stream early instead of
/// failing, since the tokenizer has already validated the expression.
pub struct ExpressionLexer<'src> {
    source: &'src str,
    position: usize,
    nesting: Vec<Nesting>,
    tokens: Vec<ExprToken>,
}

impl<'src> ExpressionLexer<'src> {
    /// Creates a new lexer for the given expression source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            nesting: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Tokenizes an entire expression.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<ExprToken> {
        let mut lexer = ExpressionLexer::new(source);
        lexer.run();
        lexer.tokens
    }

    fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.position += c.len_utf8();
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                c if c.is_whitespace() => self.advance(),
                '/' if self.rest().starts_with("//") => {
                    let end = self.rest().find('\n').unwrap_or(self.rest().len());
                    self.position += end;
                }
                '/' if self.rest().starts_with("/*") => match self.rest()[2..].find("*/") {
                    Some(end) => self.position += end + 4,
                    None => return,
                },
                '(' | '[' | '{' => {
                    if c == '{' {
                        self.nesting.push(Nesting::Brace);
                    }
                    self.advance();
                    self.tokens.push(ExprToken::Open(c));
                }
                ')' | ']' => {
                    self.advance();
                    self.tokens.push(ExprToken::Close(c));
                }
                '}' => {
                    self.advance();
                    self.tokens.push(ExprToken::Close('}'));
                    if self.nesting.pop() == Some(Nesting::Interpolation) && !self.template_chunk() {
                        return;
                    }
                }
                '`' => {
                    self.advance();
                    if !self.template_chunk() {
                        return;
                    }
                }
                '\'' | '"' => {
                    if !self.string(c) {
                        return;
                    }
                }
                c if c.is_ascii_digit() => self.number(),
                c if is_ident_start(c) => self.ident(),
                _ => self.punct(),
            }
        }
    }

    /// Consumes template text up to the closing backtick or an interpolation.
    /// Returns false if the template is unterminated.
    fn template_chunk(&mut self) -> bool {
        self.tokens.push(ExprToken::Literal);
        while let Some(c) = self.peek_char() {
            match c {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '`' => {
                    self.advance();
                    return true;
                }
                '$' if self.rest().starts_with("${") => {
                    self.position += 2;
                    self.nesting.push(Nesting::Interpolation);
                    self.tokens.push(ExprToken::Open('{'));
                    return true;
                }
                _ => self.advance(),
            }
        }
        false
    }

    fn string(&mut self, quote: char) -> bool {
        self.advance();
        while let Some(c) = self.peek_char() {
            self.advance();
            if c == '\\' {
                self.advance();
            } else if c == quote {
                self.tokens.push(ExprToken::Literal);
                return true;
            }
        }
        false
    }

    fn number(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.tokens.push(ExprToken::Literal);
    }

    fn ident(&mut self) {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if is_ident_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        self.tokens
            .push(ExprToken::Ident(self.source[start..self.position].to_string()));
    }

    fn punct(&mut self) {
        let rest = self.rest();
        if let Some(p) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            self.position += p.len();
            self.tokens.push(ExprToken::Punct(*p));
        } else {
            // Unknown character: skip it
            self.advance();
        }
    }
}

/// Returns true if `c` can start an identifier.
#[must_use]
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Returns true if `c` can appear in an identifier (not at start).
#[must_use]
pub fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
