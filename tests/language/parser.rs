//! Integration tests for the parser
//!
//! Tests parsing of WML token streams into validated parse trees.

use wml_foundation::{ErrorKind, TokenRange};
use wml_language::{ConditionKind, ParseNode, ParseTag, parse, parse_source, tokenize};

fn names(nodes: &[ParseNode]) -> Vec<&'static str> {
    nodes.iter().map(ParseNode::tag_name).collect()
}

const WORLD: &str = r#"<Asset key=(Village)>
    <Import from=(base)>
        <Use key=(lamp) />
        <Use key=(power) as=(energy) />
    </Import>
    <Variable key=(lit) default={false} />
    <Room key=(Square)>
        <Name>Village square</Name>
        <Description>
            A quiet square. <Link to=(lamp)>A lamp</Link> hangs here.<br />
            <If {lit}>It glows.</If><Else>It is dark.</Else>
        </Description>
        <Exit to=(Inn)>inn</Exit>
    </Room>
    <Feature key=(Well)><Name>well</Name></Feature>
    <Map key=(Overview)>
        <Room key=(Square) x="0" y="0" />
        <Image key=(sketch) fileURL="maps/village.png" />
    </Map>
</Asset>"#;

// =============================================================================
// Documents
// =============================================================================

#[test]
fn parse_world() {
    let nodes = parse_source(WORLD).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(
        names(&nodes[0].children),
        vec!["Import", "Variable", "Room", "Feature", "Map"]
    );
}

#[test]
fn room_children_in_order() {
    let nodes = parse_source(WORLD).unwrap();
    let room = &nodes[0].children[2];
    assert_eq!(names(&room.children), vec!["Name", "Description", "Exit"]);
    assert_eq!(
        room.children[2].tag,
        ParseTag::Exit {
            key: None,
            to: Some("Inn".into()),
            from: None
        }
    );
}

#[test]
fn description_keeps_inline_content() {
    let nodes = parse_source(WORLD).unwrap();
    let description = &nodes[0].children[2].children[1];
    let names = names(&description.children);
    assert!(names.contains(&"Link"));
    assert!(names.contains(&"br"));
    assert!(names.contains(&"Whitespace"));
    let conditions: Vec<_> = description
        .children
        .iter()
        .filter_map(ParseNode::condition_kind)
        .collect();
    assert_eq!(conditions, vec![ConditionKind::If, ConditionKind::Else]);
}

#[test]
fn imports_and_uses() {
    let nodes = parse_source(WORLD).unwrap();
    let import = &nodes[0].children[0];
    assert_eq!(import.tag, ParseTag::Import { from: "base".into() });
    assert_eq!(
        import.children[1].tag,
        ParseTag::Use {
            key: "power".into(),
            alias: Some("energy".into())
        }
    );
}

#[test]
fn map_rooms_carry_coordinates() {
    let nodes = parse_source(WORLD).unwrap();
    let map = &nodes[0].children[4];
    assert_eq!(
        map.children[0].tag,
        ParseTag::Room {
            key: "Square".into(),
            x: Some(0),
            y: Some(0)
        }
    );
    assert_eq!(
        map.children[1].tag,
        ParseTag::Image {
            key: "sketch".into(),
            file_url: Some("maps/village.png".into())
        }
    );
}

#[test]
fn conditions_take_their_parent_grammar() {
    let nodes = parse_source(
        "<Asset key=(A)><Room key=(R)><If {open}><Exit to=(B) /></If></Room><If {x}><Room key=(S) /></If></Asset>",
    )
    .unwrap();
    let in_room = &nodes[0].children[0].children[0];
    assert_eq!(names(&in_room.children), vec!["Exit"]);
    let in_asset = &nodes[0].children[1];
    assert_eq!(names(&in_asset.children), vec!["Room"]);
}

#[test]
fn bookmark_definition_and_reference() {
    let nodes = parse_source(
        "<Asset key=(A)><Bookmark key=(b)>saved text</Bookmark><Room key=(R)><Description>See <Bookmark key=(b) /></Description></Room></Asset>",
    )
    .unwrap();
    let definition = &nodes[0].children[0];
    assert_eq!(definition.tag, ParseTag::Bookmark { key: "b".into() });
    assert!(!definition.children.is_empty());
    let reference = &nodes[0].children[1].children[0].children[2];
    assert_eq!(reference.tag, ParseTag::Bookmark { key: "b".into() });
    assert!(reference.children.is_empty());
}

#[test]
fn several_top_level_nodes() {
    let nodes = parse_source("<Asset key=(A) />\n<Story key=(S) instance />").unwrap();
    assert_eq!(names(&nodes), vec!["Asset", "Story"]);
}

// =============================================================================
// Source Map
// =============================================================================

#[test]
fn ranges_index_the_token_stream() {
    let source = "<Asset key=(A)>\n  <Room key=(R) />\n</Asset>";
    let tokens = tokenize(source).unwrap();
    let nodes = parse(&tokens).unwrap();
    let asset = &nodes[0];
    assert_eq!(asset.tokens, TokenRange::new(0, tokens.len() - 1));
    let room = &asset.children[0];
    assert_eq!(tokens[room.tokens.start].text(source), "<Room");
    assert_eq!(tokens[room.tokens.end].text(source), "/>");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn link_outside_message() {
    let err = parse_source("<Asset key=(Test)><Link to=(ABC)>test</Link></Asset>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert!(err.message().contains("<Link> is not a legal child of <Asset>"));
}

#[test]
fn character_name_is_plain_text() {
    let err = parse_source(
        "<Asset key=(A)><Character key=(C)><Name>Tess<br /></Name></Character></Asset>",
    )
    .unwrap_err();
    assert!(err.message().contains("<br> is not a legal child of <Name>"));
}

#[test]
fn exit_outside_room_or_asset() {
    let err = parse_source("<Asset key=(A)><Feature key=(F)><Exit to=(B) /></Feature></Asset>")
        .unwrap_err();
    assert!(err.message().contains("<Exit> is not a legal child of <Feature>"));
}

#[test]
fn conditions_inherit_restrictions() {
    let err = parse_source("<Asset key=(A)><Room key=(R)><If {x}><Room key=(S) /></If></Room></Asset>")
        .unwrap_err();
    assert!(err.message().contains("<Room> is not a legal child of <If>"));
}

#[test]
fn error_spans_cover_the_node() {
    let source = "<Asset key=(A)>\n<Room key=(R)><Name>x</Name><Map key=(M) /></Room></Asset>";
    let err = parse_source(source).unwrap_err();
    let span = err.span().unwrap();
    assert_eq!(span.line, 2);
    assert_eq!(span.text(source), "<Map key=(M) />");
}

#[test]
fn lexical_errors_pass_through() {
    let err = parse_source("<Asset key=(A B)></Asset>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Lexical { .. }));
}
