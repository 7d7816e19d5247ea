//! Integration tests for the schema builder
//!
//! Builds whole documents and checks the normalized tree.

use test_log::test;
use wml_foundation::ErrorKind;
use wml_language::{ConditionKind, parse, parse_source, tokenize};
use wml_schema::{MessageItem, SchemaBuilder, SchemaNode, build_schema, detached};

fn schema(source: &str) -> Vec<SchemaNode> {
    build_schema(&parse_source(source).unwrap()).unwrap()
}

fn room<'a>(nodes: &'a [SchemaNode], key: &str) -> &'a wml_schema::SchemaRoom {
    nodes[0]
        .children()
        .iter()
        .find_map(|node| match node {
            SchemaNode::Room(room) if room.key == key => Some(room),
            _ => None,
        })
        .unwrap()
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn vortex() {
    let nodes = schema("<Asset key=(Test)>\n    <Room key=(VORTEX)></Room>\n</Asset>");
    let SchemaNode::Asset(asset) = &nodes[0] else {
        panic!("expected Asset");
    };
    assert_eq!(asset.key, "Test");
    assert!(matches!(
        asset.contents.as_slice(),
        [SchemaNode::Room(room)] if room.key == "VORTEX" && room.contents.is_empty()
    ));
}

#[test]
fn story_keeps_instance_flag() {
    let nodes = schema("<Story key=(Tale) instance><Room key=(A) /></Story>");
    assert!(matches!(&nodes[0], SchemaNode::Story(story) if story.instance && story.key == "Tale"));
}

#[test]
fn map_contents() {
    let nodes = schema(
        r#"<Asset key=(A)><Map key=(M)><Name>Overview</Name><Room key=(R) x="1" y="-1" /><Image key=(i) /></Map></Asset>"#,
    );
    let SchemaNode::Map(map) = &nodes[0].children()[0] else {
        panic!("expected Map");
    };
    assert_eq!(map.contents.len(), 3);
    assert!(matches!(
        &map.contents[1],
        SchemaNode::Room(room) if room.x == Some(1) && room.y == Some(-1)
    ));
}

#[test]
fn sources_point_at_tokens() {
    let source = "<Asset key=(A)><Room key=(R) /></Asset>";
    let tokens = tokenize(source).unwrap();
    let nodes = SchemaBuilder::new()
        .with_tokens(&tokens)
        .build(&parse(&tokens).unwrap())
        .unwrap();
    let range = nodes[0].children()[0].source().unwrap();
    assert_eq!(tokens[range.start].text(source), "<Room");
}

#[test]
fn detached_trees_ignore_layout() {
    let compact = schema("<Asset key=(A)><Room key=(R)><Name>Hall</Name></Room></Asset>");
    let spread = schema("<Asset key=(A)>\n  <Room key=(R)>\n    <Name>\n      Hall\n    </Name>\n  </Room>\n</Asset>");
    assert_ne!(compact, spread);
    assert_eq!(detached(&compact), detached(&spread));
}

// =============================================================================
// Exits
// =============================================================================

#[test]
fn exit_keys() {
    let nodes = schema(
        "<Asset key=(T)><Room key=(A)><Exit to=(B) /><Exit key=(door) to=(C) /></Room><Exit from=(B) to=(A) /></Asset>",
    );
    let keys: Vec<_> = wml_schema::all_exits(&nodes).iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["A#B", "door", "B#A"]);
}

#[test]
fn exit_in_room_conditional_uses_room() {
    let nodes = schema("<Asset key=(T)><Room key=(A)><If {open}><Exit to=(B) /></If></Room></Asset>");
    let exits = wml_schema::all_exits(&nodes);
    assert_eq!((exits[0].from.as_str(), exits[0].to.as_str()), ("A", "B"));
}

#[test]
fn exit_text_is_collapsed() {
    let nodes = schema("<Asset key=(T)><Room key=(A)><Exit to=(B)>\n   out   the door\n</Exit></Room></Asset>");
    assert_eq!(wml_schema::all_exits(&nodes)[0].text, "out the door");
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn node_level_chain() {
    let nodes = schema(
        "<Asset key=(T)><If {day}><Room key=(A) /></If><ElseIf {dusk}><Room key=(B) /></ElseIf><Else><Room key=(C) /></Else></Asset>",
    );
    let chains: Vec<Vec<(String, bool)>> = nodes[0]
        .children()
        .iter()
        .map(|node| match node {
            SchemaNode::Condition(c) => c
                .conditions
                .iter()
                .map(|clause| (clause.if_expression.clone(), clause.negated))
                .collect(),
            other => panic!("expected Condition, found {other:?}"),
        })
        .collect();
    assert_eq!(
        chains,
        vec![
            vec![("day".into(), false)],
            vec![("day".into(), true), ("dusk".into(), false)],
            vec![("day".into(), true), ("dusk".into(), true)],
        ]
    );
}

#[test]
fn a_new_if_starts_a_new_chain() {
    let nodes = schema(
        "<Asset key=(T)><If {a}><Room key=(A) /></If><If {b}><Room key=(B) /></If><Else><Room key=(C) /></Else></Asset>",
    );
    let SchemaNode::Condition(last) = &nodes[0].children()[2] else {
        panic!("expected Condition");
    };
    assert_eq!(last.kind, ConditionKind::Else);
    assert_eq!(last.conditions.len(), 1);
    assert_eq!(last.conditions[0].if_expression, "b");
}

#[test]
fn clause_dependencies() {
    let nodes = schema("<Asset key=(T)><If {lamp.lit && !door}><Room key=(A) /></If></Asset>");
    let SchemaNode::Condition(condition) = &nodes[0].children()[0] else {
        panic!("expected Condition");
    };
    let deps: Vec<_> = condition.dependencies().into_iter().collect();
    assert_eq!(deps, vec!["door".to_string(), "lamp".to_string()]);
}

#[test]
fn else_after_other_node() {
    let tokens = tokenize("<Asset key=(T)><Room key=(A) /><ElseIf {x}><Room key=(B) /></ElseIf></Asset>").unwrap();
    let err = SchemaBuilder::new()
        .with_tokens(&tokens)
        .build(&parse(&tokens).unwrap())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Semantic { .. }));
    assert!(err.message().contains("<ElseIf> must follow a conditional"));
    assert_eq!(err.span().unwrap().column, 32);
}

// =============================================================================
// Messages
// =============================================================================

#[test]
fn description_items() {
    let nodes = schema(
        "<Asset key=(T)><Room key=(A)><Description>\n  Dust  drifts.<br/>\n  <Link to=(B)>North</Link> is open.<Space />\n</Description></Room></Asset>",
    );
    let SchemaNode::Description(description) = &room(&nodes, "A").contents[0] else {
        panic!("expected Description");
    };
    assert_eq!(description.items[0], MessageItem::text("Dust drifts."));
    assert_eq!(description.items[1], MessageItem::LineBreak);
    assert!(matches!(&description.items[2], MessageItem::Link(link) if link.text == "North"));
    assert_eq!(description.items[3], MessageItem::text(" is open."));
    assert_eq!(description.items[4], MessageItem::Space);
    assert_eq!(description.items.len(), 5);
}

#[test]
fn inner_condition_keeps_edge_spaces() {
    let nodes = schema(
        "<Asset key=(T)><Room key=(A)><Description>It is<If {lit}> bright </If>here</Description></Room></Asset>",
    );
    let SchemaNode::Description(description) = &room(&nodes, "A").contents[0] else {
        panic!("expected Description");
    };
    let MessageItem::Condition(condition) = &description.items[1] else {
        panic!("expected Condition");
    };
    assert_eq!(condition.contents, vec![MessageItem::text(" bright ")]);
}

#[test]
fn plain_text_of_message() {
    let nodes = schema(
        "<Asset key=(T)><Room key=(A)><Name>Old <Space /> hall</Name></Room></Asset>",
    );
    let SchemaNode::Name(name) = &room(&nodes, "A").contents[0] else {
        panic!("expected Name");
    };
    assert_eq!(name.items, vec![MessageItem::text("Old"), MessageItem::Space, MessageItem::text("hall")]);
}

#[test]
fn bookmark_definition() {
    let nodes = schema("<Asset key=(T)><Bookmark key=(intro)> Once  upon <br /> a time </Bookmark></Asset>");
    let SchemaNode::Bookmark(bookmark) = &nodes[0].children()[0] else {
        panic!("expected Bookmark");
    };
    assert_eq!(
        bookmark.items,
        vec![MessageItem::text("Once upon"), MessageItem::LineBreak, MessageItem::text("a time")]
    );
}
