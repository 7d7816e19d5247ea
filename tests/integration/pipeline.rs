//! Integration tests for the compile pipeline
//!
//! Tests `wml::compile` and `wml::format` end to end, including how errors
//! from each layer are reported.

use test_log::test;
use wml::foundation::ErrorKind;
use wml::schema::{SchemaNode, cross_references, exits_by_room};

// =============================================================================
// Success
// =============================================================================

#[test]
fn compile_vortex() {
    let schema = wml::compile("<Asset key=(Test)>\n    <Room key=(VORTEX)></Room>\n</Asset>").unwrap();
    assert_eq!(schema.len(), 1);
    assert_eq!(schema[0].key(), Some("Test"));
    assert!(matches!(&schema[0].children()[0], SchemaNode::Room(room) if room.key == "VORTEX"));
}

#[test]
fn compile_empty_source() {
    assert!(wml::compile("").unwrap().is_empty());
    assert_eq!(wml::format("  // nothing here\n").unwrap(), "");
}

#[test]
fn format_vortex() {
    assert_eq!(
        wml::format("<Asset key=(Test)>\n    <Room key=(VORTEX)></Room>\n</Asset>").unwrap(),
        "<Asset key=(Test)><Room key=(VORTEX) /></Asset>"
    );
}

#[test]
fn compiled_world_is_consistent() {
    let schema = wml::compile(
        "<Asset key=(W)>
            <Room key=(A)><Exit to=(B)>east</Exit></Room>
            <Room key=(B)><Exit to=(A)>west</Exit></Room>
        </Asset>",
    )
    .unwrap();
    assert!(cross_references(&schema).is_empty());
    let rooms = exits_by_room(&schema);
    assert_eq!(rooms["A"][0].key, "A#B");
    assert_eq!(rooms["B"][0].key, "B#A");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn lexical_error_has_line() {
    let err = wml::compile("<Asset key=(A)>\n<Room key=(B C) />\n</Asset>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Lexical { .. }));
    assert_eq!(err.span().map(|s| s.line), Some(2));
    let context = err.context.unwrap();
    assert_eq!(context.line_text.as_deref(), Some("<Room key=(B C) />"));
}

#[test]
fn syntax_error_has_line() {
    let err = wml::compile("<Asset key=(Test)>\n  <Link to=(ABC)>test</Link>\n</Asset>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert_eq!(
        err.to_string(),
        "syntax error at 2:3: <Link> is not a legal child of <Asset>"
    );
    let context = err.context.unwrap();
    assert_eq!(context.line_text.as_deref(), Some("  <Link to=(ABC)>test</Link>"));
}

#[test]
fn syntax_error_keeps_tag_stack() {
    let err = wml::compile(
        "<Asset key=(A)>\n<Room key=(R)>\n<Description><Link to=\"B\">x</Link></Description>\n</Room>\n</Asset>",
    )
    .unwrap_err();
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["Asset", "Room", "Description"]);
    assert_eq!(
        context.line_text.as_deref(),
        Some("<Description><Link to=\"B\">x</Link></Description>")
    );
}

#[test]
fn semantic_error_has_line() {
    let err = wml::compile("<Asset key=(T)>\n<Exit to=(B) />\n</Asset>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Semantic { .. }));
    let context = err.context.unwrap();
    assert_eq!(context.line_text.as_deref(), Some("<Exit to=(B) />"));
}

#[test]
fn format_reports_errors() {
    let err = wml::format("<Asset key=(A)><Else><Room key=(B) /></Else></Asset>").unwrap_err();
    assert!(err.message().contains("must follow a conditional"));
}
