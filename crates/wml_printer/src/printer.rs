//! Canonical printer for schema trees.
//!
//! Every node is laid out in the first of three forms that fits the column
//! budget for its depth:
//!
//! 1. single-line: `<Tag props>contents</Tag>` or `<Tag props />`
//! 2. contents nested: the opening tag on its own line, each child (or each
//!    wrapped line of a message) indented one level, then the closing tag
//! 3. properties nested: as 2, but with each property on its own line too
//!
//! # Example
//!
//! ```
//! use wml_language::parse_source;
//! use wml_printer::print;
//! use wml_schema::build_schema;
//!
//! let source = "<Asset key=(Test)><Room key=(VORTEX) /></Asset>";
//! let schema = build_schema(&parse_source(source).unwrap()).unwrap();
//! assert_eq!(print(&schema), source);
//! ```

use tracing::debug;
use wml_schema::{MessageItem, SchemaExit, SchemaNode, SchemaUse};

use crate::config::PrintConfig;
use crate::escape::{escape_literal, escape_text};
use crate::wrap::{Line, condition_head, inline_items, render_lines, width, wrap_items};

/// What goes between a tag's opening and closing.
enum Body<'a> {
    Empty,
    Nodes(&'a [SchemaNode]),
    Uses(&'a [SchemaUse]),
    Message(&'a [MessageItem]),
    Text(&'a str),
}

impl Body<'_> {
    fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Nodes(nodes) => nodes.is_empty(),
            Self::Uses(uses) => uses.is_empty(),
            Self::Message(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

/// A node reduced to its printable parts.
struct Element<'a> {
    name: &'static str,
    /// Head of the opening tag, e.g. `If {a}`; `name` when there is no
    /// anonymous property.
    head: String,
    properties: Vec<String>,
    body: Body<'a>,
    /// Room key in effect for the children.
    room: Option<&'a str>,
}

impl<'a> Element<'a> {
    fn new(name: &'static str, room: Option<&'a str>) -> Self {
        Self {
            name,
            head: name.to_string(),
            properties: Vec::new(),
            body: Body::Empty,
            room,
        }
    }

    fn key(mut self, name: &str, value: &str) -> Self {
        self.properties.push(format!("{name}=({value})"));
        self
    }

    fn optional_key(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.key(name, value),
            None => self,
        }
    }

    fn literal(mut self, name: &str, value: &str) -> Self {
        self.properties.push(format!("{name}={}", escape_literal(value)));
        self
    }

    fn expression(mut self, name: &str, value: &str) -> Self {
        self.properties.push(format!("{name}={{{value}}}"));
        self
    }

    fn flag(mut self, name: &str, value: bool) -> Self {
        if value {
            self.properties.push(name.to_string());
        }
        self
    }

    fn body(mut self, body: Body<'a>) -> Self {
        self.body = body;
        self
    }

    /// Returns the opening tag on one line, without its final `>` or `/>`.
    fn open(&self) -> String {
        let mut out = format!("<{}", self.head);
        for property in &self.properties {
            out.push(' ');
            out.push_str(property);
        }
        out
    }
}

fn element<'a>(node: &'a SchemaNode, room: Option<&'a str>) -> Element<'a> {
    match node {
        SchemaNode::Asset(asset) => Element::new("Asset", room)
            .key("key", &asset.key)
            .body(Body::Nodes(&asset.contents)),
        SchemaNode::Story(story) => Element::new("Story", room)
            .key("key", &story.key)
            .flag("instance", story.instance)
            .body(Body::Nodes(&story.contents)),
        SchemaNode::Room(r) => {
            let mut el = Element::new("Room", Some(&r.key)).key("key", &r.key);
            if let Some(x) = r.x {
                el = el.literal("x", &x.to_string());
            }
            if let Some(y) = r.y {
                el = el.literal("y", &y.to_string());
            }
            el.body(Body::Nodes(&r.contents))
        }
        SchemaNode::Feature(feature) => Element::new("Feature", room)
            .key("key", &feature.key)
            .body(Body::Nodes(&feature.contents)),
        SchemaNode::Exit(exit) => exit_element(exit, room),
        SchemaNode::Name(message) => {
            Element::new("Name", room).body(Body::Message(&message.items))
        }
        SchemaNode::Description(message) => {
            Element::new("Description", room).body(Body::Message(&message.items))
        }
        SchemaNode::Bookmark(bookmark) => Element::new("Bookmark", room)
            .key("key", &bookmark.key)
            .body(Body::Message(&bookmark.items)),
        SchemaNode::Condition(condition) => {
            let mut el = Element::new(condition.kind.name(), room);
            el.head = condition_head(condition);
            el.body(Body::Nodes(&condition.contents))
        }
        SchemaNode::Variable(variable) => {
            let el = Element::new("Variable", room).key("key", &variable.key);
            match &variable.default {
                Some(default) => el.expression("default", default),
                None => el,
            }
        }
        SchemaNode::Computed(computed) => Element::new("Computed", room)
            .key("key", &computed.key)
            .expression("src", &computed.src),
        SchemaNode::Action(action) => Element::new("Action", room)
            .key("key", &action.key)
            .expression("src", &action.src),
        SchemaNode::Import(import) => Element::new("Import", room)
            .key("from", &import.from)
            .body(Body::Uses(&import.uses)),
        SchemaNode::Character(character) => Element::new("Character", room)
            .key("key", &character.key)
            .body(Body::Nodes(&character.contents)),
        SchemaNode::Pronouns(p) => Element::new("Pronouns", room)
            .literal("subject", &p.pronouns.subject)
            .literal("object", &p.pronouns.object)
            .literal("possessive", &p.pronouns.possessive)
            .literal("adjective", &p.pronouns.adjective)
            .literal("reflexive", &p.pronouns.reflexive),
        SchemaNode::FirstImpression(text) => {
            Element::new("FirstImpression", room).body(Body::Text(&text.text))
        }
        SchemaNode::OneCoolThing(text) => {
            Element::new("OneCoolThing", room).body(Body::Text(&text.text))
        }
        SchemaNode::Outfit(text) => Element::new("Outfit", room).body(Body::Text(&text.text)),
        SchemaNode::Image(image) => {
            let el = Element::new("Image", room).key("key", &image.key);
            match &image.file_url {
                Some(url) => el.literal("fileURL", url),
                None => el,
            }
        }
        SchemaNode::Map(map) => Element::new("Map", room)
            .key("key", &map.key)
            .body(Body::Nodes(&map.contents)),
    }
}

/// Endpoints equal to the enclosing room and a synthesized key are implied,
/// so they are left out. At least one endpoint is always kept.
fn exit_element<'a>(exit: &'a SchemaExit, room: Option<&'a str>) -> Element<'a> {
    let synthetic = SchemaExit::synthetic_key(&exit.from, &exit.to);
    let key = (exit.key != synthetic).then_some(exit.key.as_str());
    let from = (room != Some(exit.from.as_str())).then_some(exit.from.as_str());
    let to = (from.is_none() || room != Some(exit.to.as_str())).then_some(exit.to.as_str());
    Element::new("Exit", room)
        .optional_key("key", key)
        .optional_key("from", from)
        .optional_key("to", to)
        .body(Body::Text(&exit.text))
}

fn use_element(usage: &SchemaUse) -> Element<'_> {
    Element::new("Use", None)
        .key("key", &usage.key)
        .optional_key("as", usage.alias.as_deref())
}

// =============================================================================
// Layout
// =============================================================================

/// Lays out schema nodes as lines.
struct Printer<'c> {
    config: &'c PrintConfig,
}

impl Printer<'_> {
    /// Renders an element on one line.
    fn inline(&self, el: &Element<'_>) -> String {
        let mut out = el.open();
        if el.body.is_empty() {
            out.push_str(" />");
            return out;
        }
        out.push('>');
        match &el.body {
            Body::Empty => {}
            Body::Nodes(nodes) => {
                for node in *nodes {
                    out.push_str(&self.inline(&element(node, el.room)));
                }
            }
            Body::Uses(uses) => {
                for usage in *uses {
                    out.push_str(&self.inline(&use_element(usage)));
                }
            }
            Body::Message(items) => out.push_str(&inline_items(items)),
            Body::Text(text) => out.push_str(&escape_text(text)),
        }
        out.push_str("</");
        out.push_str(el.name);
        out.push('>');
        out
    }

    fn lines(&self, el: &Element<'_>, depth: usize) -> Vec<Line> {
        let single = self.inline(el);
        let budget = self.config.budget(depth);
        if width(&single) <= budget {
            return vec![Line::new(depth, single)];
        }

        let mut lines = Vec::new();
        let open = el.open();
        if el.body.is_empty() {
            lines.push(Line::new(depth, format!("<{}", el.head)));
            for property in &el.properties {
                lines.push(Line::new(depth + 1, property.clone()));
            }
            lines.push(Line::new(depth, "/>"));
            return lines;
        }

        if width(&open) < budget {
            lines.push(Line::new(depth, format!("{open}>")));
        } else {
            lines.push(Line::new(depth, format!("<{}", el.head)));
            for property in &el.properties {
                lines.push(Line::new(depth + 1, property.clone()));
            }
            lines.push(Line::new(depth, ">"));
        }

        match &el.body {
            Body::Empty => {}
            Body::Nodes(nodes) => {
                for node in *nodes {
                    lines.extend(self.lines(&element(node, el.room), depth + 1));
                }
            }
            Body::Uses(uses) => {
                for usage in *uses {
                    lines.extend(self.lines(&use_element(usage), depth + 1));
                }
            }
            Body::Message(items) => lines.extend(wrap_items(items, depth + 1, self.config)),
            Body::Text(text) => {
                let items = [MessageItem::text(*text)];
                lines.extend(wrap_items(&items, depth + 1, self.config));
            }
        }

        lines.push(Line::new(depth, format!("</{}>", el.name)));
        lines
    }
}

/// Lays out `nodes` as lines starting at `depth`.
#[must_use]
pub fn layout(nodes: &[SchemaNode], depth: usize, config: &PrintConfig) -> Vec<Line> {
    let printer = Printer { config };
    nodes
        .iter()
        .flat_map(|node| printer.lines(&element(node, None), depth))
        .collect()
}

/// Prints schema nodes in canonical form with the default configuration.
#[must_use]
pub fn print(nodes: &[SchemaNode]) -> String {
    print_with_config(nodes, &PrintConfig::default())
}

/// Prints schema nodes in canonical form.
#[must_use]
pub fn print_with_config(nodes: &[SchemaNode], config: &PrintConfig) -> String {
    print_with_indent(nodes, 0, config)
}

/// Prints schema nodes in canonical form, indented to `depth`.
///
/// Used when the output is embedded inside an enclosing tag.
#[must_use]
pub fn print_with_indent(nodes: &[SchemaNode], depth: usize, config: &PrintConfig) -> String {
    let lines = layout(nodes, depth, config);
    let output = render_lines(&lines, config);
    debug!(nodes = nodes.len(), lines = lines.len(), bytes = output.len(), "printed schema");
    output
}
