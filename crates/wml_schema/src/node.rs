//! Schema tree for WML.
//!
//! Schema nodes mirror parse nodes with derived fields filled in: condition
//! chains, expression dependencies, resolved exit endpoints, and flattened
//! tagged messages. Each node keeps the [`TokenRange`] of the parse node it
//! came from (`None` for nodes built programmatically).

use std::collections::BTreeSet;

use wml_foundation::TokenRange;
use wml_language::{ConditionKind, Pronouns};

/// A node in the schema tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchemaNode {
    /// `<Asset>`
    Asset(SchemaAsset),
    /// `<Story>`
    Story(SchemaStory),
    /// `<Room>`
    Room(SchemaRoom),
    /// `<Feature>`
    Feature(SchemaFeature),
    /// `<Exit>`
    Exit(SchemaExit),
    /// `<Name>`
    Name(SchemaMessage),
    /// `<Description>`
    Description(SchemaMessage),
    /// Asset-level `<Bookmark>` definition.
    Bookmark(SchemaBookmark),
    /// `<If>`, `<ElseIf>` or `<Else>` outside a message.
    Condition(SchemaCondition<SchemaNode>),
    /// `<Variable>`
    Variable(SchemaVariable),
    /// `<Computed>`
    Computed(SchemaComputed),
    /// `<Action>`
    Action(SchemaAction),
    /// `<Import>`
    Import(SchemaImport),
    /// `<Character>`
    Character(SchemaCharacter),
    /// `<Pronouns>`
    Pronouns(SchemaPronouns),
    /// `<FirstImpression>`
    FirstImpression(SchemaText),
    /// `<OneCoolThing>`
    OneCoolThing(SchemaText),
    /// `<Outfit>`
    Outfit(SchemaText),
    /// `<Image>`
    Image(SchemaImage),
    /// `<Map>`
    Map(SchemaMap),
}

/// A flattened tagged-message item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageItem {
    /// Text with whitespace runs collapsed to single spaces.
    String(String),
    /// `<Link to=(k)>text</Link>`
    Link(SchemaLink),
    /// `<br />`
    LineBreak,
    /// `<Space />`
    Space,
    /// `<Bookmark key=(k) />` reference.
    Bookmark(SchemaBookmarkRef),
    /// A conditional run of items.
    Condition(SchemaCondition<MessageItem>),
}

impl MessageItem {
    /// Creates a text item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }
}

/// One `if` clause of a condition chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionClause {
    /// Expression source.
    pub if_expression: String,
    /// True if this clause must be false for the branch to apply.
    pub negated: bool,
    /// Free variables of the expression.
    pub dependencies: BTreeSet<String>,
}

impl ConditionClause {
    /// Creates an un-negated clause, extracting its dependencies.
    #[must_use]
    pub fn new(if_expression: impl Into<String>) -> Self {
        let if_expression = if_expression.into();
        let dependencies = crate::dependencies::extract(&if_expression);
        Self {
            if_expression,
            negated: false,
            dependencies,
        }
    }

    /// Returns this clause negated.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            negated: true,
            ..self.clone()
        }
    }
}

/// An If/ElseIf/Else branch.
///
/// `conditions` is the full chain the branch depends on: every preceding
/// clause negated, followed by the branch's own clause (absent for Else).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaCondition<T> {
    /// Which member of the chain this branch is.
    pub kind: ConditionKind,
    /// Conditions that must all hold.
    pub conditions: Vec<ConditionClause>,
    /// Branch contents.
    pub contents: Vec<T>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl<T> SchemaCondition<T> {
    /// Returns the branch's own clause: the last one for If and `ElseIf`.
    #[must_use]
    pub fn own_clause(&self) -> Option<&ConditionClause> {
        match self.kind {
            ConditionKind::If | ConditionKind::ElseIf => self.conditions.last(),
            ConditionKind::Else => None,
        }
    }

    /// Returns the union of all clause dependencies.
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.conditions
            .iter()
            .flat_map(|clause| clause.dependencies.iter().cloned())
            .collect()
    }
}

/// `<Asset key=(k)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaAsset {
    /// Asset key.
    pub key: String,
    /// Asset-level contents.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Story key=(k) instance>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaStory {
    /// Story key.
    pub key: String,
    /// Whether this is an instanced story.
    pub instance: bool,
    /// Asset-level contents.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Room key=(k)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaRoom {
    /// Room key.
    pub key: String,
    /// Map column.
    pub x: Option<i64>,
    /// Map row.
    pub y: Option<i64>,
    /// Names, descriptions, exits and conditions.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Feature key=(k)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaFeature {
    /// Feature key.
    pub key: String,
    /// Names, descriptions and conditions.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Exit>` with both endpoints resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaExit {
    /// Exit key, `"{from}#{to}"` unless given.
    pub key: String,
    /// Source room.
    pub from: String,
    /// Destination room.
    pub to: String,
    /// Exit text.
    pub text: String,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl SchemaExit {
    /// Returns the key synthesized for an exit between two rooms.
    #[must_use]
    pub fn synthetic_key(from: &str, to: &str) -> String {
        format!("{from}#{to}")
    }
}

/// A tagged message (`<Name>` or `<Description>`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaMessage {
    /// Flattened contents.
    pub items: Vec<MessageItem>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl SchemaMessage {
    /// Returns the plain text of the message, ignoring conditions and links'
    /// targets.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            match item {
                MessageItem::String(s) => text.push_str(s),
                MessageItem::Link(link) => text.push_str(&link.text),
                MessageItem::LineBreak => text.push('\n'),
                MessageItem::Space => text.push(' '),
                MessageItem::Bookmark(_) | MessageItem::Condition(_) => {}
            }
        }
        text
    }
}

/// `<Link to=(k)>text</Link>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaLink {
    /// Link target key.
    pub to: String,
    /// Link text.
    pub text: String,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// Asset-level `<Bookmark key=(k)>message</Bookmark>`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaBookmark {
    /// Bookmark key.
    pub key: String,
    /// Flattened contents.
    pub items: Vec<MessageItem>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// In-message `<Bookmark key=(k) />`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaBookmarkRef {
    /// Referenced bookmark key.
    pub key: String,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Variable key=(k) default={expr} />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVariable {
    /// Variable key.
    pub key: String,
    /// Default expression source.
    pub default: Option<String>,
    /// Free variables of the default expression.
    pub dependencies: BTreeSet<String>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Computed key=(k) src={expr} />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaComputed {
    /// Computed key.
    pub key: String,
    /// Expression source.
    pub src: String,
    /// Free variables of `src`.
    pub dependencies: BTreeSet<String>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Action key=(k) src={expr} />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaAction {
    /// Action key.
    pub key: String,
    /// Expression source.
    pub src: String,
    /// Free variables of `src`.
    pub dependencies: BTreeSet<String>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Import from=(asset)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaImport {
    /// Source asset key.
    pub from: String,
    /// Imported keys.
    pub uses: Vec<SchemaUse>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Use key=(k) as=(alias) />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaUse {
    /// Key in the source asset.
    pub key: String,
    /// Local alias.
    pub alias: Option<String>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl SchemaUse {
    /// Returns the key this import is known by locally.
    #[must_use]
    pub fn local_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.key)
    }
}

/// `<Character key=(k)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaCharacter {
    /// Character key.
    pub key: String,
    /// Name, pronouns, details and images.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl SchemaCharacter {
    /// Returns the character's name as plain text, or the key if unnamed.
    #[must_use]
    pub fn name(&self) -> String {
        self.contents
            .iter()
            .find_map(|node| match node {
                SchemaNode::Name(message) => Some(message.plain_text()),
                _ => None,
            })
            .unwrap_or_else(|| self.key.clone())
    }

    /// Returns the character's pronouns, if given.
    #[must_use]
    pub fn pronouns(&self) -> Option<&Pronouns> {
        self.contents.iter().find_map(|node| match node {
            SchemaNode::Pronouns(p) => Some(&p.pronouns),
            _ => None,
        })
    }
}

/// `<Pronouns ... />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaPronouns {
    /// The pronoun set.
    pub pronouns: Pronouns,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// Plain text content (`<FirstImpression>`, `<OneCoolThing>`, `<Outfit>`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaText {
    /// Text with whitespace collapsed.
    pub text: String,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Image key=(k) fileURL="..." />`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaImage {
    /// Image key.
    pub key: String,
    /// Image location.
    pub file_url: Option<String>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

/// `<Map key=(k)>`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaMap {
    /// Map key.
    pub key: String,
    /// Names, rooms, images and conditions.
    pub contents: Vec<SchemaNode>,
    /// Originating tokens.
    pub source: Option<TokenRange>,
}

impl SchemaNode {
    /// Returns the tag name of this node.
    #[must_use]
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Asset(_) => "Asset",
            Self::Story(_) => "Story",
            Self::Room(_) => "Room",
            Self::Feature(_) => "Feature",
            Self::Exit(_) => "Exit",
            Self::Name(_) => "Name",
            Self::Description(_) => "Description",
            Self::Bookmark(_) => "Bookmark",
            Self::Condition(c) => c.kind.name(),
            Self::Variable(_) => "Variable",
            Self::Computed(_) => "Computed",
            Self::Action(_) => "Action",
            Self::Import(_) => "Import",
            Self::Character(_) => "Character",
            Self::Pronouns(_) => "Pronouns",
            Self::FirstImpression(_) => "FirstImpression",
            Self::OneCoolThing(_) => "OneCoolThing",
            Self::Outfit(_) => "Outfit",
            Self::Image(_) => "Image",
            Self::Map(_) => "Map",
        }
    }

    /// Returns the key of this node, if it has one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Asset(n) => Some(&n.key),
            Self::Story(n) => Some(&n.key),
            Self::Room(n) => Some(&n.key),
            Self::Feature(n) => Some(&n.key),
            Self::Exit(n) => Some(&n.key),
            Self::Bookmark(n) => Some(&n.key),
            Self::Variable(n) => Some(&n.key),
            Self::Computed(n) => Some(&n.key),
            Self::Action(n) => Some(&n.key),
            Self::Character(n) => Some(&n.key),
            Self::Image(n) => Some(&n.key),
            Self::Map(n) => Some(&n.key),
            Self::Name(_)
            | Self::Description(_)
            | Self::Condition(_)
            | Self::Import(_)
            | Self::Pronouns(_)
            | Self::FirstImpression(_)
            | Self::OneCoolThing(_)
            | Self::Outfit(_) => None,
        }
    }

    /// Returns the originating token range.
    #[must_use]
    pub const fn source(&self) -> Option<TokenRange> {
        match self {
            Self::Asset(n) => n.source,
            Self::Story(n) => n.source,
            Self::Room(n) => n.source,
            Self::Feature(n) => n.source,
            Self::Exit(n) => n.source,
            Self::Name(n) | Self::Description(n) => n.source,
            Self::Bookmark(n) => n.source,
            Self::Condition(n) => n.source,
            Self::Variable(n) => n.source,
            Self::Computed(n) => n.source,
            Self::Action(n) => n.source,
            Self::Import(n) => n.source,
            Self::Character(n) => n.source,
            Self::Pronouns(n) => n.source,
            Self::FirstImpression(n) | Self::OneCoolThing(n) | Self::Outfit(n) => n.source,
            Self::Image(n) => n.source,
            Self::Map(n) => n.source,
        }
    }

    /// Returns the child nodes of this node (message items excluded).
    #[must_use]
    pub fn children(&self) -> &[SchemaNode] {
        match self {
            Self::Asset(n) => &n.contents,
            Self::Story(n) => &n.contents,
            Self::Room(n) => &n.contents,
            Self::Feature(n) => &n.contents,
            Self::Condition(n) => &n.contents,
            Self::Character(n) => &n.contents,
            Self::Map(n) => &n.contents,
            _ => &[],
        }
    }

    /// Returns the tagged message this node holds, if any.
    #[must_use]
    pub fn message(&self) -> Option<&[MessageItem]> {
        match self {
            Self::Name(m) | Self::Description(m) => Some(&m.items),
            Self::Bookmark(b) => Some(&b.items),
            _ => None,
        }
    }

    /// Returns a copy of this tree with every source back-reference cleared,
    /// so trees from different sources compare structurally.
    #[must_use]
    pub fn detached(&self) -> Self {
        let mut node = self.clone();
        node.detach();
        node
    }

    fn detach(&mut self) {
        match self {
            Self::Asset(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Story(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Room(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Feature(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Character(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Map(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Condition(n) => {
                n.source = None;
                detach_all(&mut n.contents);
            }
            Self::Name(n) | Self::Description(n) => {
                n.source = None;
                detach_items(&mut n.items);
            }
            Self::Bookmark(n) => {
                n.source = None;
                detach_items(&mut n.items);
            }
            Self::Import(n) => {
                n.source = None;
                for u in &mut n.uses {
                    u.source = None;
                }
            }
            Self::Exit(n) => n.source = None,
            Self::Variable(n) => n.source = None,
            Self::Computed(n) => n.source = None,
            Self::Action(n) => n.source = None,
            Self::Pronouns(n) => n.source = None,
            Self::FirstImpression(n) | Self::OneCoolThing(n) | Self::Outfit(n) => n.source = None,
            Self::Image(n) => n.source = None,
        }
    }
}

fn detach_all(nodes: &mut [SchemaNode]) {
    for node in nodes {
        node.detach();
    }
}

fn detach_items(items: &mut [MessageItem]) {
    for item in items {
        match item {
            MessageItem::Link(link) => link.source = None,
            MessageItem::Bookmark(bookmark) => bookmark.source = None,
            MessageItem::Condition(condition) => {
                condition.source = None;
                detach_items(&mut condition.contents);
            }
            MessageItem::String(_) | MessageItem::LineBreak | MessageItem::Space => {}
        }
    }
}

/// Returns a copy of `nodes` with every source back-reference cleared.
#[must_use]
pub fn detached(nodes: &[SchemaNode]) -> Vec<SchemaNode> {
    nodes.iter().map(SchemaNode::detached).collect()
}
