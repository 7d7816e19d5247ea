//! Per-tag grammars.
//!
//! A [`TagGrammar`] lists the properties a tag accepts (with the value kind
//! each expects) and the child tags it may contain. Some grammars depend on
//! the enclosing tags: conditions take on the child set of their nearest
//! non-condition ancestor, `Name` holds plain text inside a `Character`,
//! `Bookmark` is a childless reference inside a message, and `Room` requires
//! coordinates inside a `Map`.

/// The kind of value a property carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Bare `name` or `!name`.
    Boolean,
    /// `(identifier)`
    Key,
    /// `"literal"`
    Literal,
    /// `{expression}`
    Expression,
}

impl ValueKind {
    /// Returns a human-readable name for this value kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Key => "key",
            Self::Literal => "literal",
            Self::Expression => "expression",
        }
    }
}

/// A property value as written in an opening tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// Boolean property.
    Boolean(bool),
    /// Key value.
    Key(String),
    /// Literal value with escapes resolved.
    Literal(String),
    /// Expression source without braces.
    Expression(String),
}

impl PropertyValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Key(_) => ValueKind::Key,
            Self::Literal(_) => ValueKind::Literal,
            Self::Expression(_) => ValueKind::Expression,
        }
    }
}

/// One property a tag accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyRule {
    /// Property name; `""` is the anonymous `{expr}` property.
    pub key: &'static str,
    /// The value kind expected.
    pub kind: ValueKind,
    /// Whether the property must be present.
    pub required: bool,
}

impl PropertyRule {
    const fn required(key: &'static str, kind: ValueKind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }

    const fn optional(key: &'static str, kind: ValueKind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }
}

/// The grammar of one tag in one context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagGrammar {
    /// The tag name.
    pub tag: &'static str,
    /// Accepted properties, in canonical order.
    pub properties: Vec<PropertyRule>,
    /// Legal child tag names (`String` and `Whitespace` for bare content).
    pub children: &'static [&'static str],
}

impl TagGrammar {
    /// Looks up the rule for property `key`.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyRule> {
        self.properties.iter().find(|rule| rule.key == key)
    }

    /// Returns true if `child` is a legal child tag.
    #[must_use]
    pub fn allows_child(&self, child: &str) -> bool {
        self.children.contains(&child)
    }

    /// Returns true if `child` is silently dropped from this tag's children.
    ///
    /// Comments are always dropped. Whitespace is dropped unless the tag
    /// holds text.
    #[must_use]
    pub fn ignores_child(&self, child: &str) -> bool {
        child == "Comment" || (child == "Whitespace" && !self.allows_child("Whitespace"))
    }

    /// Returns true if this tag holds a tagged message.
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.allows_child("String") && self.allows_child("If")
    }
}

use PropertyRule as P;
use ValueKind::{Boolean, Expression, Key, Literal};

/// Tags legal at the top level of a document.
pub const TOP_LEVEL: &[&str] = &["Asset", "Story"];

/// Children of `Asset` and `Story`.
pub const ASSET_LEVEL: &[&str] = &[
    "Room",
    "Feature",
    "Exit",
    "Bookmark",
    "Variable",
    "Computed",
    "Action",
    "Import",
    "Character",
    "Image",
    "Map",
    "If",
    "ElseIf",
    "Else",
];

/// Children of message containers.
pub const MESSAGE: &[&str] = &[
    "String",
    "Whitespace",
    "Link",
    "br",
    "Space",
    "Bookmark",
    "If",
    "ElseIf",
    "Else",
];

/// Children of `Name` outside a `Character`.
pub const NAME: &[&str] = &["String", "Whitespace", "Space", "If", "ElseIf", "Else"];

/// Children of plain-text tags.
pub const TEXT: &[&str] = &["String", "Whitespace"];

const ROOM: &[&str] = &["Name", "Description", "Exit", "If", "ElseIf", "Else"];
const FEATURE: &[&str] = &["Name", "Description", "If", "ElseIf", "Else"];
const CHARACTER: &[&str] = &[
    "Name",
    "Pronouns",
    "FirstImpression",
    "OneCoolThing",
    "Outfit",
    "Image",
];
const MAP: &[&str] = &["Name", "Room", "Image", "If", "ElseIf", "Else"];
const IMPORT: &[&str] = &["Use"];
const NONE: &[&str] = &[];

/// Returns true if `tag` is an If, `ElseIf` or Else.
#[must_use]
pub fn is_condition(tag: &str) -> bool {
    matches!(tag, "If" | "ElseIf" | "Else")
}

/// Returns the nearest enclosing tag that is not a condition.
#[must_use]
pub fn nearest_non_condition<S: AsRef<str>>(context: &[S]) -> Option<(usize, &str)> {
    context
        .iter()
        .enumerate()
        .rev()
        .map(|(i, tag)| (i, tag.as_ref()))
        .find(|(_, tag)| !is_condition(tag))
}

/// Returns the grammar for `tag` given the enclosing open tags (outermost
/// first), or `None` for an unknown tag.
#[must_use]
pub fn grammar_for<S: AsRef<str>>(tag: &str, context: &[S]) -> Option<TagGrammar> {
    let parent = nearest_non_condition(context);
    let (properties, children): (Vec<PropertyRule>, &'static [&'static str]) = match tag {
        "Asset" => (vec![P::required("key", Key)], ASSET_LEVEL),
        "Story" => (
            vec![P::required("key", Key), P::optional("instance", Boolean)],
            ASSET_LEVEL,
        ),
        "Room" => {
            let in_map = parent.is_some_and(|(_, p)| p == "Map");
            let coordinate = |key| PropertyRule {
                key,
                kind: Literal,
                required: in_map,
            };
            (
                vec![P::required("key", Key), coordinate("x"), coordinate("y")],
                ROOM,
            )
        }
        "Feature" => (vec![P::required("key", Key)], FEATURE),
        "Exit" => (
            vec![
                P::optional("key", Key),
                P::optional("from", Key),
                P::optional("to", Key),
            ],
            TEXT,
        ),
        "Description" => (Vec::new(), MESSAGE),
        "Name" => {
            let in_character = parent.is_some_and(|(_, p)| p == "Character");
            (Vec::new(), if in_character { TEXT } else { NAME })
        }
        "Link" => (vec![P::required("to", Key)], TEXT),
        "Bookmark" => {
            let in_message = parent.is_some_and(|(i, p)| {
                grammar_for(p, &context[..i]).is_some_and(|g| g.is_message())
            });
            (
                vec![P::required("key", Key)],
                if in_message { NONE } else { MESSAGE },
            )
        }
        "If" | "ElseIf" => (
            vec![P::required("", Expression)],
            condition_children(parent, context),
        ),
        "Else" => (Vec::new(), condition_children(parent, context)),
        "Variable" => (
            vec![P::required("key", Key), P::optional("default", Expression)],
            NONE,
        ),
        "Computed" | "Action" => (
            vec![P::required("key", Key), P::required("src", Expression)],
            NONE,
        ),
        "Import" => (vec![P::required("from", Key)], IMPORT),
        "Use" => (vec![P::required("key", Key), P::optional("as", Key)], NONE),
        "Character" => (vec![P::required("key", Key)], CHARACTER),
        "Pronouns" => (
            vec![
                P::required("subject", Literal),
                P::required("object", Literal),
                P::required("possessive", Literal),
                P::required("adjective", Literal),
                P::required("reflexive", Literal),
            ],
            NONE,
        ),
        "FirstImpression" | "OneCoolThing" | "Outfit" => (Vec::new(), TEXT),
        "Image" => (
            vec![P::required("key", Key), P::optional("fileURL", Literal)],
            NONE,
        ),
        "Map" => (vec![P::required("key", Key)], MAP),
        "br" | "Space" => (Vec::new(), NONE),
        _ => return None,
    };
    let tag = *KNOWN_TAGS.iter().find(|known| **known == tag)?;
    Some(TagGrammar {
        tag,
        properties,
        children,
    })
}

/// Conditions contain whatever their nearest non-condition ancestor does.
fn condition_children<S: AsRef<str>>(
    parent: Option<(usize, &str)>,
    context: &[S],
) -> &'static [&'static str] {
    parent
        .and_then(|(i, p)| grammar_for(p, &context[..i]))
        .map_or(NONE, |g| g.children)
}

/// Every tag name the parser recognizes.
pub const KNOWN_TAGS: &[&str] = &[
    "Asset",
    "Story",
    "Room",
    "Feature",
    "Exit",
    "Description",
    "Name",
    "Link",
    "Bookmark",
    "If",
    "ElseIf",
    "Else",
    "Variable",
    "Computed",
    "Action",
    "Import",
    "Use",
    "Character",
    "Pronouns",
    "FirstImpression",
    "OneCoolThing",
    "Outfit",
    "Image",
    "Map",
    "br",
    "Space",
];
