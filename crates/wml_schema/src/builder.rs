//! Schema builder.
//!
//! Walks a validated parse tree and produces the schema tree: condition
//! chains are threaded through sibling lists, expression dependencies are
//! extracted, exits get both endpoints from their enclosing room, and message
//! contents are flattened into tagged-message items.

use tracing::debug;
use wml_foundation::{Error, Result, Span, TokenRange};
use wml_language::{ConditionKind, ParseNode, ParseTag, Token};

use crate::conditions::ConditionChain;
use crate::dependencies;
use crate::messages::{Piece, collapse, normalize};
use crate::node::{
    ConditionClause, MessageItem, SchemaAction, SchemaAsset, SchemaBookmark, SchemaBookmarkRef,
    SchemaCharacter, SchemaComputed, SchemaCondition, SchemaExit, SchemaFeature, SchemaImage,
    SchemaImport, SchemaLink, SchemaMap, SchemaMessage, SchemaNode, SchemaPronouns, SchemaRoom,
    SchemaStory, SchemaText, SchemaUse, SchemaVariable,
};

/// Builds schema trees from parse trees.
#[derive(Debug, Default)]
pub struct SchemaBuilder<'tok> {
    /// Tokens the parse tree was built from, for error spans.
    tokens: Option<&'tok [Token]>,
    /// Keys of the enclosing rooms, innermost last.
    rooms: Vec<String>,
}

impl<'tok> SchemaBuilder<'tok> {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves error spans against the given tokens.
    #[must_use]
    pub fn with_tokens(mut self, tokens: &'tok [Token]) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Builds schema nodes for a list of top-level parse nodes.
    ///
    /// # Errors
    /// Returns the first semantic error: a dangling `ElseIf`/`Else`, or an
    /// exit whose endpoints cannot be resolved.
    pub fn build(&mut self, nodes: &[ParseNode]) -> Result<Vec<SchemaNode>> {
        self.rooms.clear();
        let schema = self.build_nodes(nodes)?;
        debug!(nodes = schema.len(), "built schema");
        Ok(schema)
    }

    fn build_nodes(&mut self, nodes: &[ParseNode]) -> Result<Vec<SchemaNode>> {
        let mut chain = ConditionChain::new();
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match &node.tag {
                ParseTag::Whitespace | ParseTag::Comment => {}
                ParseTag::Condition {
                    kind,
                    if_expression,
                } => {
                    let conditions = self.advance(&mut chain, *kind, if_expression.as_deref(), node)?;
                    out.push(SchemaNode::Condition(SchemaCondition {
                        kind: *kind,
                        conditions,
                        contents: self.build_nodes(&node.children)?,
                        source: Some(node.tokens),
                    }));
                }
                _ => {
                    chain.reset();
                    out.push(self.build_node(node)?);
                }
            }
        }
        Ok(out)
    }

    fn advance(
        &self,
        chain: &mut ConditionChain,
        kind: ConditionKind,
        if_expression: Option<&str>,
        node: &ParseNode,
    ) -> Result<Vec<ConditionClause>> {
        let own = if_expression.map(ConditionClause::new);
        chain.advance(kind, own).ok_or_else(|| {
            self.error(
                format!("<{}> must follow a conditional", kind.name()),
                node.tokens,
            )
        })
    }

    #[allow(clippy::too_many_lines)]
    fn build_node(&mut self, node: &ParseNode) -> Result<SchemaNode> {
        let source = Some(node.tokens);
        let schema = match &node.tag {
            ParseTag::Asset { key } => SchemaNode::Asset(SchemaAsset {
                key: key.clone(),
                contents: self.build_nodes(&node.children)?,
                source,
            }),
            ParseTag::Story { key, instance } => SchemaNode::Story(SchemaStory {
                key: key.clone(),
                instance: *instance,
                contents: self.build_nodes(&node.children)?,
                source,
            }),
            ParseTag::Room { key, x, y } => {
                self.rooms.push(key.clone());
                let contents = self.build_nodes(&node.children);
                self.rooms.pop();
                SchemaNode::Room(SchemaRoom {
                    key: key.clone(),
                    x: *x,
                    y: *y,
                    contents: contents?,
                    source,
                })
            }
            ParseTag::Feature { key } => SchemaNode::Feature(SchemaFeature {
                key: key.clone(),
                contents: self.build_nodes(&node.children)?,
                source,
            }),
            ParseTag::Exit { key, to, from } => {
                let room = self.rooms.last();
                let from = from.clone().or_else(|| room.cloned());
                let to = to.clone().or_else(|| room.cloned());
                let (Some(from), Some(to)) = (from, to) else {
                    return Err(self.error(
                        "Exit outside a Room must give both 'to' and 'from'",
                        node.tokens,
                    ));
                };
                SchemaNode::Exit(SchemaExit {
                    key: key
                        .clone()
                        .unwrap_or_else(|| SchemaExit::synthetic_key(&from, &to)),
                    from,
                    to,
                    text: plain_text(&node.children),
                    source,
                })
            }
            ParseTag::Name => SchemaNode::Name(SchemaMessage {
                items: self.flatten(&node.children, true)?,
                source,
            }),
            ParseTag::Description => SchemaNode::Description(SchemaMessage {
                items: self.flatten(&node.children, true)?,
                source,
            }),
            ParseTag::Bookmark { key } => SchemaNode::Bookmark(SchemaBookmark {
                key: key.clone(),
                items: self.flatten(&node.children, true)?,
                source,
            }),
            ParseTag::Variable { key, default } => SchemaNode::Variable(SchemaVariable {
                key: key.clone(),
                default: default.clone(),
                dependencies: default
                    .as_deref()
                    .map(dependencies::extract)
                    .unwrap_or_default(),
                source,
            }),
            ParseTag::Computed { key, src } => SchemaNode::Computed(SchemaComputed {
                key: key.clone(),
                src: src.clone(),
                dependencies: dependencies::extract(src),
                source,
            }),
            ParseTag::Action { key, src } => SchemaNode::Action(SchemaAction {
                key: key.clone(),
                src: src.clone(),
                dependencies: dependencies::extract(src),
                source,
            }),
            ParseTag::Import { from } => SchemaNode::Import(SchemaImport {
                from: from.clone(),
                uses: node
                    .children
                    .iter()
                    .filter_map(|child| match &child.tag {
                        ParseTag::Use { key, alias } => Some(SchemaUse {
                            key: key.clone(),
                            alias: alias.clone(),
                            source: Some(child.tokens),
                        }),
                        _ => None,
                    })
                    .collect(),
                source,
            }),
            ParseTag::Character { key } => SchemaNode::Character(SchemaCharacter {
                key: key.clone(),
                contents: self.build_nodes(&node.children)?,
                source,
            }),
            ParseTag::Pronouns(pronouns) => SchemaNode::Pronouns(SchemaPronouns {
                pronouns: pronouns.clone(),
                source,
            }),
            ParseTag::FirstImpression => SchemaNode::FirstImpression(text_node(node)),
            ParseTag::OneCoolThing => SchemaNode::OneCoolThing(text_node(node)),
            ParseTag::Outfit => SchemaNode::Outfit(text_node(node)),
            ParseTag::Image { key, file_url } => SchemaNode::Image(SchemaImage {
                key: key.clone(),
                file_url: file_url.clone(),
                source,
            }),
            ParseTag::Map { key } => SchemaNode::Map(SchemaMap {
                key: key.clone(),
                contents: self.build_nodes(&node.children)?,
                source,
            }),
            ParseTag::Condition { .. }
            | ParseTag::Use { .. }
            | ParseTag::Link { .. }
            | ParseTag::LineBreak
            | ParseTag::Space
            | ParseTag::String(_)
            | ParseTag::Whitespace
            | ParseTag::Comment => {
                return Err(self.error(
                    format!("<{}> cannot appear outside its container", node.tag_name()),
                    node.tokens,
                ));
            }
        };
        Ok(schema)
    }

    /// Flattens message children into tagged-message items.
    fn flatten(&self, children: &[ParseNode], outermost: bool) -> Result<Vec<MessageItem>> {
        let mut chain = ConditionChain::new();
        let mut pieces = Vec::with_capacity(children.len());
        for child in children {
            let source = Some(child.tokens);
            let item = match &child.tag {
                ParseTag::String(text) => {
                    if !text.trim().is_empty() {
                        chain.reset();
                    }
                    pieces.push(Piece::Text(text.clone()));
                    continue;
                }
                ParseTag::Whitespace => {
                    pieces.push(Piece::Gap);
                    continue;
                }
                ParseTag::Comment => continue,
                ParseTag::Condition {
                    kind,
                    if_expression,
                } => {
                    let conditions = self.advance(&mut chain, *kind, if_expression.as_deref(), child)?;
                    pieces.push(Piece::Item(MessageItem::Condition(SchemaCondition {
                        kind: *kind,
                        conditions,
                        contents: self.flatten(&child.children, false)?,
                        source,
                    })));
                    continue;
                }
                ParseTag::Link { to } => {
                    // Edge whitespace belongs to the surrounding text
                    let text = plain_text(&child.children);
                    let (lead, trail) = edge_whitespace(&child.children);
                    if lead {
                        pieces.push(Piece::Gap);
                    }
                    chain.reset();
                    let empty = text.is_empty();
                    pieces.push(Piece::Item(MessageItem::Link(SchemaLink {
                        to: to.clone(),
                        text,
                        source,
                    })));
                    if trail && !empty {
                        pieces.push(Piece::Gap);
                    }
                    continue;
                }
                ParseTag::LineBreak => MessageItem::LineBreak,
                ParseTag::Space => MessageItem::Space,
                ParseTag::Bookmark { key } => MessageItem::Bookmark(SchemaBookmarkRef {
                    key: key.clone(),
                    source,
                }),
                _ => {
                    return Err(self.error(
                        format!("<{}> cannot appear in a message", child.tag_name()),
                        child.tokens,
                    ));
                }
            };
            chain.reset();
            pieces.push(Piece::Item(item));
        }
        Ok(normalize(pieces, outermost))
    }

    /// Creates a semantic error covering `range`.
    fn error(&self, message: impl Into<String>, range: TokenRange) -> Error {
        Error::semantic(message, span_of(self.tokens, range), range)
    }
}

/// Returns the source span covered by `range`, or the start of input when
/// the tokens are unavailable.
pub(crate) fn span_of(tokens: Option<&[Token]>, range: TokenRange) -> Span {
    tokens
        .and_then(|tokens| {
            let first = tokens.get(range.start)?;
            let last = tokens.get(range.end).unwrap_or(first);
            Some(first.span.to(last.span))
        })
        .unwrap_or_else(Span::at_start)
}

/// Concatenates text children, collapsing whitespace.
fn plain_text(children: &[ParseNode]) -> String {
    let mut text = String::new();
    for child in children {
        match &child.tag {
            ParseTag::String(s) => text.push_str(s),
            ParseTag::Whitespace => text.push(' '),
            _ => {}
        }
    }
    collapse(&text)
}

/// Returns whether text children start and end with whitespace, ignoring
/// comments.
fn edge_whitespace(children: &[ParseNode]) -> (bool, bool) {
    let is_text = |child: &&ParseNode| !matches!(child.tag, ParseTag::Comment);
    let is_gap = |child: Option<&ParseNode>| matches!(child.map(|c| &c.tag), Some(ParseTag::Whitespace));
    (
        is_gap(children.iter().find(is_text)),
        is_gap(children.iter().rev().find(is_text)),
    )
}

fn text_node(node: &ParseNode) -> SchemaText {
    SchemaText {
        text: plain_text(&node.children),
        source: Some(node.tokens),
    }
}

/// Builds schema nodes for a list of top-level parse nodes.
///
/// # Errors
/// Returns the first semantic error.
pub fn build_schema(nodes: &[ParseNode]) -> Result<Vec<SchemaNode>> {
    SchemaBuilder::new().build(nodes)
}
