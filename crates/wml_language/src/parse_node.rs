//! Parse tree for WML.
//!
//! A [`ParseNode`] is produced by the parser once a tag's properties and
//! children have been validated against its grammar. Each node records the
//! [`TokenRange`] it was built from, which later phases use as a source map.

use wml_foundation::TokenRange;

/// A node in the parse tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNode {
    /// The tag and its validated properties.
    pub tag: ParseTag,
    /// Token indices from the opening token to the finishing token.
    pub tokens: TokenRange,
    /// Validated children, in source order. Ignorable children are dropped.
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// Creates a new parse node.
    #[must_use]
    pub fn new(tag: ParseTag, tokens: TokenRange, children: Vec<ParseNode>) -> Self {
        Self {
            tag,
            tokens,
            children,
        }
    }

    /// Creates a childless node lifted from a single token.
    #[must_use]
    pub fn leaf(tag: ParseTag, index: usize) -> Self {
        Self::new(tag, TokenRange::single(index), Vec::new())
    }

    /// Returns the tag name of this node (`String`, `Whitespace` and
    /// `Comment` for bare content).
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        self.tag.name()
    }

    /// Returns this node's children.
    #[must_use]
    pub fn children(&self) -> &[ParseNode] {
        &self.children
    }

    /// Returns the condition kind if this is an If, `ElseIf` or Else node.
    #[must_use]
    pub const fn condition_kind(&self) -> Option<ConditionKind> {
        match &self.tag {
            ParseTag::Condition { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Which member of an If/ElseIf/Else chain a condition is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    /// `<If {expr}>`
    If,
    /// `<ElseIf {expr}>`
    ElseIf,
    /// `<Else>`
    Else,
}

impl ConditionKind {
    /// Returns the tag name for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::If => "If",
            Self::ElseIf => "ElseIf",
            Self::Else => "Else",
        }
    }
}

/// Character pronoun set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pronouns {
    /// e.g. "she"
    pub subject: String,
    /// e.g. "her"
    pub object: String,
    /// e.g. "hers"
    pub possessive: String,
    /// e.g. "her"
    pub adjective: String,
    /// e.g. "herself"
    pub reflexive: String,
}

/// A tag together with its typed properties.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParseTag {
    /// `<Asset key=(k)>`
    Asset { key: String },
    /// `<Story key=(k) instance>`
    Story { key: String, instance: bool },
    /// `<Room key=(k) x="0" y="0">`
    Room {
        key: String,
        x: Option<i64>,
        y: Option<i64>,
    },
    /// `<Feature key=(k)>`
    Feature { key: String },
    /// `<Exit to=(b)>`; at least one of `to` and `from` is present.
    Exit {
        key: Option<String>,
        to: Option<String>,
        from: Option<String>,
    },
    /// `<Description>`
    Description,
    /// `<Name>`
    Name,
    /// `<Link to=(k)>`
    Link { to: String },
    /// `<Bookmark key=(k)>`, a definition or (inside a message) a reference.
    Bookmark { key: String },
    /// `<If {expr}>`, `<ElseIf {expr}>` or `<Else>`.
    Condition {
        kind: ConditionKind,
        if_expression: Option<String>,
    },
    /// `<Variable key=(k) default={expr} />`
    Variable {
        key: String,
        default: Option<String>,
    },
    /// `<Computed key=(k) src={expr} />`
    Computed { key: String, src: String },
    /// `<Action key=(k) src={expr} />`
    Action { key: String, src: String },
    /// `<Import from=(asset)>`
    Import { from: String },
    /// `<Use key=(k) as=(alias) />`
    Use { key: String, alias: Option<String> },
    /// `<Character key=(k)>`
    Character { key: String },
    /// `<Pronouns subject="she" ... />`
    Pronouns(Pronouns),
    /// `<FirstImpression>`
    FirstImpression,
    /// `<OneCoolThing>`
    OneCoolThing,
    /// `<Outfit>`
    Outfit,
    /// `<Image key=(k) fileURL="..." />`
    Image {
        key: String,
        file_url: Option<String>,
    },
    /// `<Map key=(k)>`
    Map { key: String },
    /// `<br />`
    LineBreak,
    /// `<Space />`
    Space,
    /// Bare text with escapes resolved.
    String(String),
    /// A whitespace run.
    Whitespace,
    /// A comment.
    Comment,
}

impl ParseTag {
    /// Returns the tag name as written in source.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Asset { .. } => "Asset",
            Self::Story { .. } => "Story",
            Self::Room { .. } => "Room",
            Self::Feature { .. } => "Feature",
            Self::Exit { .. } => "Exit",
            Self::Description => "Description",
            Self::Name => "Name",
            Self::Link { .. } => "Link",
            Self::Bookmark { .. } => "Bookmark",
            Self::Condition { kind, .. } => kind.name(),
            Self::Variable { .. } => "Variable",
            Self::Computed { .. } => "Computed",
            Self::Action { .. } => "Action",
            Self::Import { .. } => "Import",
            Self::Use { .. } => "Use",
            Self::Character { .. } => "Character",
            Self::Pronouns(_) => "Pronouns",
            Self::FirstImpression => "FirstImpression",
            Self::OneCoolThing => "OneCoolThing",
            Self::Outfit => "Outfit",
            Self::Image { .. } => "Image",
            Self::Map { .. } => "Map",
            Self::LineBreak => "br",
            Self::Space => "Space",
            Self::String(_) => "String",
            Self::Whitespace => "Whitespace",
            Self::Comment => "Comment",
        }
    }
}
