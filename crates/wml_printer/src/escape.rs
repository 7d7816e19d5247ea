//! Escaping of text and literal values.

/// Escapes message text so it re-tokenizes to the same characters.
///
/// Backslash and angle brackets are escaped, as is a `/` that would
/// otherwise open a comment.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '/' if matches!(chars.peek(), Some('/' | '*')) => out.push_str("\\/"),
            c => out.push(c),
        }
    }
    out
}

/// Escapes the body of a `"..."` literal value.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
