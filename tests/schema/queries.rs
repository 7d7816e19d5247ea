//! Integration tests for schema queries
//!
//! Tests exit grouping, cross-reference checks and custom visitors over
//! built documents.

use wml_language::{parse, parse_source, tokenize};
use wml_schema::exits::EntranceCounter;
use wml_schema::visitor::{DepthCalculator, walk_all};
use wml_schema::{
    CrossReferences, MessageItem, SchemaNode, SchemaRoom, SchemaVisitor, build_schema,
    cross_references, exits_by_room,
};

const TOWN: &str = "<Asset key=(Town)>
    <Import from=(Forest)><Use key=(Clearing) /><Use key=(owl) /></Import>
    <Bookmark key=(sign)>Welcome</Bookmark>
    <Room key=(Gate)>
        <Name>Gate</Name>
        <Description>
            <Bookmark key=(sign) />. <Link to=(Well)>A well</Link> stands nearby.
            <If {night}>An <Link to=(owl)>owl</Link> hoots.</If>
        </Description>
        <Exit to=(Market)>market</Exit>
        <Exit to=(Clearing)>forest path</Exit>
    </Room>
    <Room key=(Market)>
        <Exit to=(Gate) />
        <If {open}><Exit to=(Shop) /></If>
    </Room>
    <Room key=(Shop) />
    <Feature key=(Well) />
    <Exit from=(Clearing) to=(Gate)>town gate</Exit>
</Asset>";

fn schema(source: &str) -> Vec<SchemaNode> {
    build_schema(&parse_source(source).unwrap()).unwrap()
}

// =============================================================================
// Exits
// =============================================================================

#[test]
fn exits_grouped_by_origin() {
    let nodes = schema(TOWN);
    let rooms = exits_by_room(&nodes);
    let summary: Vec<(&str, Vec<&str>)> = rooms
        .iter()
        .map(|(room, exits)| (room.as_str(), exits.iter().map(|e| e.to.as_str()).collect()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Clearing", vec!["Gate"]),
            ("Gate", vec!["Market", "Clearing"]),
            ("Market", vec!["Gate", "Shop"]),
        ]
    );
}

#[test]
fn entrances_counted() {
    let nodes = schema(TOWN);
    let entrances = EntranceCounter::count(&nodes);
    assert_eq!(entrances.get("Gate"), Some(&2));
    assert_eq!(entrances.get("Shop"), Some(&1));
    assert_eq!(entrances.get("Well"), None);
}

// =============================================================================
// Cross References
// =============================================================================

#[test]
fn town_resolves() {
    let errors = cross_references(&schema(TOWN));
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn link_to_exit_key_is_dangling() {
    let errors = cross_references(&schema(
        "<Asset key=(a)><Room key=(A)><Description><Link to=(door)>door</Link></Description><Exit key=(door) to=(A) /></Room></Asset>",
    ));
    let messages: Vec<_> = errors.iter().map(|e| e.message().to_string()).collect();
    assert_eq!(messages, vec!["Link to unknown key 'door'"]);
}

#[test]
fn exit_to_feature_is_dangling() {
    let errors = cross_references(&schema(
        "<Asset key=(a)><Room key=(A)><Exit to=(lamp) /></Room><Feature key=(lamp) /></Asset>",
    ));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Exit 'A#lamp' to unknown room 'lamp'");
}

#[test]
fn rooms_inside_conditions_and_maps_count() {
    let errors = cross_references(&schema(
        r#"<Asset key=(a)>
            <If {x}><Room key=(A) /></If>
            <Map key=(m)><Room key=(B) x="0" y="0" /></Map>
            <Exit from=(A) to=(B) />
        </Asset>"#,
    ));
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn errors_point_at_source() {
    let source = "<Asset key=(a)>\n  <Room key=(A)>\n    <Exit to=(Nowhere) />\n  </Room>\n</Asset>";
    let tokens = tokenize(source).unwrap();
    let nodes = build_schema(&parse(&tokens).unwrap()).unwrap();
    let errors = CrossReferences::new().with_tokens(&tokens).check(&nodes);
    let span = errors[0].span().unwrap();
    assert_eq!((span.line, span.column), (3, 5));
}

// =============================================================================
// Visitors
// =============================================================================

#[derive(Default)]
struct Outline {
    lines: Vec<String>,
    room: Option<String>,
    conditional: usize,
}

impl SchemaVisitor for Outline {
    fn enter_room(&mut self, room: &SchemaRoom) {
        self.room = Some(room.key.clone());
        self.lines.push(format!("room {}", room.key));
    }

    fn leave_room(&mut self, _room: &SchemaRoom) {
        self.room = None;
    }

    fn visit_message_item(&mut self, item: &MessageItem) {
        if let MessageItem::Link(link) = item {
            let room = self.room.as_deref().unwrap_or("-");
            let marker = if self.conditional > 0 { "?" } else { "" };
            self.lines.push(format!("{room} -> {}{marker}", link.to));
        }
    }

    fn enter_message_condition(&mut self, _condition: &wml_schema::SchemaCondition<MessageItem>) {
        self.conditional += 1;
    }

    fn leave_message_condition(&mut self, _condition: &wml_schema::SchemaCondition<MessageItem>) {
        self.conditional -= 1;
    }
}

#[test]
fn outline_visitor() {
    let nodes = schema(TOWN);
    let mut outline = Outline::default();
    walk_all(&mut outline, &nodes);
    assert_eq!(
        outline.lines,
        vec!["room Gate", "Gate -> Well", "Gate -> owl?", "room Market", "room Shop"]
    );
}

#[test]
fn depth_of_town() {
    let nodes = schema(TOWN);
    let mut depth = DepthCalculator::default();
    walk_all(&mut depth, &nodes);
    // Asset > Room > If > Exit
    assert_eq!(depth.max_depth, 4);
}
