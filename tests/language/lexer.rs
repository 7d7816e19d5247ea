//! Integration tests for the lexer
//!
//! Tests tokenization of WML source in both contents and tag mode.

use wml_foundation::ErrorKind;
use wml_language::{Lexer, TokenKind, tokenize};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
}

fn property(key: &str) -> TokenKind {
    TokenKind::Property {
        key: key.to_string(),
        is_boolean: false,
        value: false,
    }
}

fn flag(key: &str, value: bool) -> TokenKind {
    TokenKind::Property {
        key: key.to_string(),
        is_boolean: true,
        value,
    }
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn self_closing_room() {
    assert_eq!(
        kinds("<Room key=(ABC) />"),
        vec![
            TokenKind::TagOpenBegin("Room".into()),
            TokenKind::Whitespace,
            property("key"),
            TokenKind::KeyValue("ABC".into()),
            TokenKind::Whitespace,
            TokenKind::TagOpenEnd { self_closing: true },
        ]
    );
}

#[test]
fn open_and_close() {
    assert_eq!(
        kinds("<Name>Hall</Name>"),
        vec![
            TokenKind::TagOpenBegin("Name".into()),
            TokenKind::TagOpenEnd {
                self_closing: false
            },
            TokenKind::Description("Hall".into()),
            TokenKind::TagClose("Name".into()),
        ]
    );
}

#[test]
fn all_value_kinds() {
    assert_eq!(
        kinds(r#"<Room key=(A) x="3" y={1 + 1}>"#),
        vec![
            TokenKind::TagOpenBegin("Room".into()),
            TokenKind::Whitespace,
            property("key"),
            TokenKind::KeyValue("A".into()),
            TokenKind::Whitespace,
            property("x"),
            TokenKind::LiteralValue("3".into()),
            TokenKind::Whitespace,
            property("y"),
            TokenKind::ExpressionValue("1 + 1".into()),
            TokenKind::TagOpenEnd {
                self_closing: false
            },
        ]
    );
}

#[test]
fn boolean_properties() {
    assert_eq!(
        kinds("<Story key=(s) instance !draft />"),
        vec![
            TokenKind::TagOpenBegin("Story".into()),
            TokenKind::Whitespace,
            property("key"),
            TokenKind::KeyValue("s".into()),
            TokenKind::Whitespace,
            flag("instance", true),
            TokenKind::Whitespace,
            flag("draft", false),
            TokenKind::Whitespace,
            TokenKind::TagOpenEnd { self_closing: true },
        ]
    );
}

#[test]
fn anonymous_expression() {
    let tokens = kinds("<If {lit && !broken}>");
    assert_eq!(
        tokens[2],
        TokenKind::ExpressionValue("lit && !broken".into())
    );
}

#[test]
fn nested_braces_in_expression() {
    let tokens = kinds("<Action key=(go) src={() => { open = !open }} />");
    assert!(tokens.contains(&TokenKind::ExpressionValue(
        "() => { open = !open }".into()
    )));
}

#[test]
fn literal_escapes_resolved() {
    let tokens = kinds(r#"<Image key=(i) fileURL="a\"b\\c" />"#);
    assert!(tokens.contains(&TokenKind::LiteralValue(r#"a"b\c"#.into())));
}

// =============================================================================
// Contents
// =============================================================================

#[test]
fn text_escapes_resolved() {
    assert_eq!(
        kinds(r"\<b\>"),
        vec![TokenKind::Description("<b>".into())]
    );
}

#[test]
fn whitespace_runs_are_tokens() {
    assert_eq!(
        kinds("one\n  two"),
        vec![
            TokenKind::Description("one".into()),
            TokenKind::Whitespace,
            TokenKind::Description("two".into()),
        ]
    );
}

#[test]
fn comments_in_both_modes() {
    let tokens = kinds("// note\n<Room /* here */ key=(A) />");
    assert_eq!(tokens[0], TokenKind::Comment);
    assert_eq!(
        tokens.iter().filter(|k| **k == TokenKind::Comment).count(),
        2
    );
}

#[test]
fn single_slash_is_text() {
    assert_eq!(
        kinds("and/or"),
        vec![TokenKind::Description("and/or".into())]
    );
}

// =============================================================================
// Source Map
// =============================================================================

#[test]
fn tokens_cover_source() {
    let source = "<Asset key=(T)>\n  <Room key=(A)>Hi // c\n</Room></Asset>";
    let tokens = tokenize(source).unwrap();
    let mut at = 0;
    for token in &tokens {
        assert_eq!(token.span.start, at);
        at = token.span.end;
    }
    assert_eq!(at, source.len());
}

#[test]
fn spans_track_lines() {
    let tokens = tokenize("<Asset key=(T)>\n  <Room key=(A) />\n</Asset>").unwrap();
    let room = tokens
        .iter()
        .find(|t| t.kind == TokenKind::TagOpenBegin("Room".into()))
        .unwrap();
    assert_eq!((room.span.line, room.span.column), (2, 3));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn illegal_key_character() {
    let err = tokenize("<Room key=(A-B) />").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Lexical { .. }));
    assert!(err.message().contains("illegal character in key value"));
}

#[test]
fn unterminated_tag_close() {
    let err = tokenize("<Name>x</Name").unwrap_err();
    assert!(err.message().contains("expected '>'"));
}

#[test]
fn error_token_ends_stream() {
    let tokens = Lexer::tokenize_all("<Room key=(A%) />");
    assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Error(_))));
}
