//! Parser for WML.
//!
//! The parser assembles a flat token stream into a tree of [`ParseNode`]s
//! using a single explicit stack of frames. Opening tags are held as
//! [`Frame::PendingOpen`] until their `>` arrives; closing tags pop frames
//! down to the matching [`Frame::Open`] and hand the collected properties and
//! children to the tag's factory, which validates them against the tag's
//! grammar in the context of the still-open ancestors.

use tracing::{debug, trace};
use wml_foundation::{Error, ErrorContext, Result, TokenRange};

use crate::grammar::{PropertyValue, TOP_LEVEL, TagGrammar, grammar_for};
use crate::parse_node::{ConditionKind, ParseNode, ParseTag, Pronouns};
use crate::token::{Token, TokenKind};

/// A property assembled from the tokens of an opening tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// Property name (`""` for an anonymous expression).
    pub key: String,
    /// The value.
    pub value: PropertyValue,
    /// The property's tokens.
    pub tokens: TokenRange,
}

/// A frame on the parser stack.
#[derive(Debug)]
enum Frame {
    /// `<Tag` seen, waiting for `>` or `/>`.
    PendingOpen { tag: String, start: usize },
    /// Opening tag complete, collecting children.
    Open {
        tag: String,
        start: usize,
        properties: Vec<Property>,
    },
    /// A raw token: a property token inside a pending tag, or bare content.
    Token(usize),
    /// A finished child node.
    CompletedNode(ParseNode),
}

/// Parser for a WML token stream.
pub struct Parser<'tok> {
    /// The tokens being parsed.
    tokens: &'tok [Token],
    /// The frame stack.
    stack: Vec<Frame>,
    /// Completed top-level nodes.
    output: Vec<ParseNode>,
}

impl<'tok> Parser<'tok> {
    /// Creates a new parser over the given tokens.
    #[must_use]
    pub fn new(tokens: &'tok [Token]) -> Self {
        Self {
            tokens,
            stack: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Parses all tokens into top-level nodes.
    ///
    /// # Errors
    /// Returns the first syntax error encountered.
    pub fn parse_all(mut self) -> Result<Vec<ParseNode>> {
        let tokens = self.tokens;
        for (index, token) in tokens.iter().enumerate() {
            self.step(index, &token.kind)?;
        }

        if let Some((tag, start)) = self.innermost_tag() {
            let message = format!("Unclosed tag <{tag}>");
            return Err(self.error(message, TokenRange::single(start)));
        }

        debug!(
            tokens = self.tokens.len(),
            nodes = self.output.len(),
            "parsed token stream"
        );
        Ok(self.output)
    }

    fn step(&mut self, index: usize, kind: &TokenKind) -> Result<()> {
        match kind {
            TokenKind::TagOpenBegin(tag) => self.open_begin(index, tag),
            TokenKind::TagOpenEnd { self_closing } => self.open_end(index, *self_closing),
            TokenKind::TagClose(tag) => self.close(index, tag),
            TokenKind::Property { .. }
            | TokenKind::KeyValue(_)
            | TokenKind::LiteralValue(_)
            | TokenKind::ExpressionValue(_) => {
                if self.in_pending_tag() {
                    self.stack.push(Frame::Token(index));
                    Ok(())
                } else if matches!(kind, TokenKind::Property { .. }) {
                    Err(self.error("Unexpected property outside of a tag", TokenRange::single(index)))
                } else {
                    Err(self.error("Unexpected value token", TokenRange::single(index)))
                }
            }
            TokenKind::Whitespace | TokenKind::Comment => {
                if !self.stack.is_empty() {
                    self.stack.push(Frame::Token(index));
                }
                Ok(())
            }
            TokenKind::Description(_) => {
                if self.in_pending_tag() {
                    Err(self.error("Unexpected text inside a tag", TokenRange::single(index)))
                } else if self.stack.is_empty() {
                    Err(self.error("Unexpected text outside of a tag", TokenRange::single(index)))
                } else {
                    self.stack.push(Frame::Token(index));
                    Ok(())
                }
            }
            TokenKind::Error(message) => Err(self.error(message.clone(), TokenRange::single(index))),
        }
    }

    /// Handles `<Tag`.
    fn open_begin(&mut self, index: usize, tag: &str) -> Result<()> {
        if self.in_pending_tag() {
            return Err(self.error("Illegal nested tag opening", TokenRange::single(index)));
        }
        if grammar_for(tag, &self.context()).is_none() {
            return Err(self.error(format!("Unknown tag <{tag}>"), TokenRange::single(index)));
        }
        trace!(tag, depth = self.stack.len(), "pending open");
        self.stack.push(Frame::PendingOpen {
            tag: tag.to_string(),
            start: index,
        });
        Ok(())
    }

    /// Handles `>` and `/>`.
    fn open_end(&mut self, index: usize, self_closing: bool) -> Result<()> {
        let mut raw = Vec::new();
        let (tag, start) = loop {
            match self.stack.pop() {
                Some(Frame::Token(i)) => raw.push(i),
                Some(Frame::PendingOpen { tag, start }) => break (tag, start),
                _ => return Err(self.error("Unexpected tag-end", TokenRange::single(index))),
            }
        };
        raw.reverse();
        let properties = self.assemble_properties(&raw)?;

        if self_closing {
            let context = self.context();
            let node = self.build(&tag, TokenRange::new(start, index), properties, Vec::new(), &context)?;
            trace!(tag = %tag, "self-closing");
            self.emit(node)
        } else {
            trace!(tag = %tag, depth = self.stack.len(), "open");
            self.stack.push(Frame::Open {
                tag,
                start,
                properties,
            });
            Ok(())
        }
    }

    /// Handles `</Tag>`.
    fn close(&mut self, index: usize, name: &str) -> Result<()> {
        let mut children = Vec::new();
        let (tag, start, properties) = loop {
            match self.stack.pop() {
                Some(Frame::CompletedNode(node)) => children.push(node),
                Some(Frame::Token(i)) => children.push(self.lift(i)?),
                Some(Frame::Open {
                    tag,
                    start,
                    properties,
                }) => break (tag, start, properties),
                Some(Frame::PendingOpen { .. }) => {
                    return Err(self.error("Unexpected closing tag inside a tag", TokenRange::single(index)));
                }
                None => {
                    return Err(self.error(
                        format!("Unmatched closing tag </{name}>"),
                        TokenRange::single(index),
                    ));
                }
            }
        };
        if tag != name {
            return Err(self.error(
                format!("Mismatched closing tag: expected </{tag}>, found </{name}>"),
                TokenRange::new(start, index),
            ));
        }
        children.reverse();

        let context = self.context();
        let node = self.build(&tag, TokenRange::new(start, index), properties, children, &context)?;
        trace!(tag = %tag, children = node.children.len(), "close");
        self.emit(node)
    }

    /// Hands a completed node to its parent frame, or to the output.
    fn emit(&mut self, node: ParseNode) -> Result<()> {
        if self.stack.is_empty() {
            if !TOP_LEVEL.contains(&node.tag_name()) {
                let message = format!("<{}> is not allowed at the top level", node.tag_name());
                return Err(self.error(message, node.tokens));
            }
            self.output.push(node);
        } else {
            self.stack.push(Frame::CompletedNode(node));
        }
        Ok(())
    }

    /// Lifts a bare content token into a trivial node.
    fn lift(&self, index: usize) -> Result<ParseNode> {
        let tag = match &self.tokens[index].kind {
            TokenKind::Description(text) => ParseTag::String(text.clone()),
            TokenKind::Whitespace => ParseTag::Whitespace,
            TokenKind::Comment => ParseTag::Comment,
            _ => return Err(self.error("Unexpected value token", TokenRange::single(index))),
        };
        Ok(ParseNode::leaf(tag, index))
    }

    /// Partitions the tokens of an opening tag into properties.
    fn assemble_properties(&self, raw: &[usize]) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        let mut i = 0;
        while i < raw.len() {
            let index = raw[i];
            i += 1;
            match &self.tokens[index].kind {
                TokenKind::Whitespace | TokenKind::Comment => {}
                TokenKind::Property {
                    key,
                    is_boolean: true,
                    value,
                } => properties.push(Property {
                    key: key.clone(),
                    value: PropertyValue::Boolean(*value),
                    tokens: TokenRange::single(index),
                }),
                TokenKind::Property {
                    key,
                    is_boolean: false,
                    ..
                } => {
                    let value = raw
                        .get(i)
                        .and_then(|&v| value_of(&self.tokens[v].kind).map(|value| (v, value)));
                    let Some((end, value)) = value else {
                        let message = format!("Property '{key}' has no value");
                        return Err(self.error(message, TokenRange::single(index)));
                    };
                    i += 1;
                    properties.push(Property {
                        key: key.clone(),
                        value,
                        tokens: TokenRange::new(index, end),
                    });
                }
                TokenKind::ExpressionValue(source) => properties.push(Property {
                    key: String::new(),
                    value: PropertyValue::Expression(source.clone()),
                    tokens: TokenRange::single(index),
                }),
                TokenKind::KeyValue(_) | TokenKind::LiteralValue(_) => {
                    return Err(self.error("Unexpected value token", TokenRange::single(index)));
                }
                other => {
                    let message = format!("Unexpected {} inside a tag", other.name());
                    return Err(self.error(message, TokenRange::single(index)));
                }
            }
        }
        Ok(properties)
    }

    /// Validates properties and children against the tag's grammar and
    /// builds the node.
    fn build(
        &self,
        tag: &str,
        range: TokenRange,
        properties: Vec<Property>,
        children: Vec<ParseNode>,
        context: &[&str],
    ) -> Result<ParseNode> {
        let Some(grammar) = grammar_for(tag, context) else {
            return Err(self.error(format!("Unknown tag <{tag}>"), range));
        };
        let props = self.check_properties(&grammar, range, properties)?;
        let children = self.check_children(&grammar, children)?;
        let tag = self.make_tag(&grammar, range, &props)?;
        Ok(ParseNode::new(tag, range, children))
    }

    fn check_properties(
        &self,
        grammar: &TagGrammar,
        range: TokenRange,
        properties: Vec<Property>,
    ) -> Result<Props> {
        let mut seen: Vec<Property> = Vec::with_capacity(properties.len());
        for property in properties {
            let Some(rule) = grammar.property(&property.key) else {
                let message = if property.key.is_empty() {
                    format!("Unexpected expression value on <{}>", grammar.tag)
                } else {
                    format!("Unknown property '{}' on <{}>", property.key, grammar.tag)
                };
                return Err(self.error(message, property.tokens));
            };
            if property.value.kind() != rule.kind {
                let message = format!(
                    "Property '{}' on <{}> expects a {} value, found {}",
                    property.key,
                    grammar.tag,
                    rule.kind.name(),
                    property.value.kind().name()
                );
                return Err(self.error(message, property.tokens));
            }
            if seen.iter().any(|p| p.key == property.key) {
                let message = format!("Duplicate property '{}' on <{}>", property.key, grammar.tag);
                return Err(self.error(message, property.tokens));
            }
            seen.push(property);
        }

        if let Some(missing) = grammar
            .properties
            .iter()
            .find(|rule| rule.required && !seen.iter().any(|p| p.key == rule.key))
        {
            let message = if missing.key.is_empty() {
                format!("<{}> requires an expression", grammar.tag)
            } else {
                format!(
                    "Missing required property '{}' on <{}>",
                    missing.key, grammar.tag
                )
            };
            return Err(self.error(message, TokenRange::single(range.start)));
        }
        Ok(Props(seen))
    }

    fn check_children(&self, grammar: &TagGrammar, children: Vec<ParseNode>) -> Result<Vec<ParseNode>> {
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            let name = child.tag_name();
            if grammar.ignores_child(name) {
                continue;
            }
            if !grammar.allows_child(name) {
                let message = if name == "String" {
                    format!("Unexpected text in <{}>", grammar.tag)
                } else {
                    format!("<{name}> is not a legal child of <{}>", grammar.tag)
                };
                return Err(self.error(message, child.tokens));
            }
            kept.push(child);
        }
        Ok(kept)
    }

    /// Converts validated properties into the tag's typed form.
    fn make_tag(&self, grammar: &TagGrammar, range: TokenRange, props: &Props) -> Result<ParseTag> {
        let key = || props.required_text("key");
        let tag = match grammar.tag {
            "Asset" => ParseTag::Asset { key: key()? },
            "Story" => ParseTag::Story {
                key: key()?,
                instance: props.boolean("instance").unwrap_or(false),
            },
            "Room" => ParseTag::Room {
                key: key()?,
                x: self.coordinate(props, "x")?,
                y: self.coordinate(props, "y")?,
            },
            "Feature" => ParseTag::Feature { key: key()? },
            "Exit" => {
                let to = props.text("to");
                let from = props.text("from");
                if to.is_none() && from.is_none() {
                    return Err(self.error("Exit requires at least one of 'to' or 'from'", range));
                }
                ParseTag::Exit {
                    key: props.text("key"),
                    to,
                    from,
                }
            }
            "Description" => ParseTag::Description,
            "Name" => ParseTag::Name,
            "Link" => ParseTag::Link {
                to: props.required_text("to")?,
            },
            "Bookmark" => ParseTag::Bookmark { key: key()? },
            "If" => ParseTag::Condition {
                kind: ConditionKind::If,
                if_expression: Some(props.required_text("")?),
            },
            "ElseIf" => ParseTag::Condition {
                kind: ConditionKind::ElseIf,
                if_expression: Some(props.required_text("")?),
            },
            "Else" => ParseTag::Condition {
                kind: ConditionKind::Else,
                if_expression: None,
            },
            "Variable" => ParseTag::Variable {
                key: key()?,
                default: props.text("default"),
            },
            "Computed" => ParseTag::Computed {
                key: key()?,
                src: props.required_text("src")?,
            },
            "Action" => ParseTag::Action {
                key: key()?,
                src: props.required_text("src")?,
            },
            "Import" => ParseTag::Import {
                from: props.required_text("from")?,
            },
            "Use" => ParseTag::Use {
                key: key()?,
                alias: props.text("as"),
            },
            "Character" => ParseTag::Character { key: key()? },
            "Pronouns" => ParseTag::Pronouns(Pronouns {
                subject: props.required_text("subject")?,
                object: props.required_text("object")?,
                possessive: props.required_text("possessive")?,
                adjective: props.required_text("adjective")?,
                reflexive: props.required_text("reflexive")?,
            }),
            "FirstImpression" => ParseTag::FirstImpression,
            "OneCoolThing" => ParseTag::OneCoolThing,
            "Outfit" => ParseTag::Outfit,
            "Image" => ParseTag::Image {
                key: key()?,
                file_url: props.text("fileURL"),
            },
            "Map" => ParseTag::Map { key: key()? },
            "br" => ParseTag::LineBreak,
            "Space" => ParseTag::Space,
            other => return Err(Error::internal(format!("no factory for <{other}>"))),
        };
        Ok(tag)
    }

    /// Parses a Room coordinate as an integer.
    fn coordinate(&self, props: &Props, key: &str) -> Result<Option<i64>> {
        let Some(property) = props.get(key) else {
            return Ok(None);
        };
        match &property.value {
            PropertyValue::Literal(text) => text.trim().parse::<i64>().map(Some).map_err(|_| {
                self.error(
                    format!("malformed Room coordinates: '{key}' is not an integer"),
                    property.tokens,
                )
            }),
            _ => Ok(None),
        }
    }

    /// Returns true if the innermost tag frame is still pending its `>`.
    fn in_pending_tag(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|frame| matches!(frame, Frame::PendingOpen { .. } | Frame::Open { .. }))
            .is_some_and(|frame| matches!(frame, Frame::PendingOpen { .. }))
    }

    /// Returns the innermost pending or open tag and its start token.
    fn innermost_tag(&self) -> Option<(&str, usize)> {
        self.stack.iter().rev().find_map(|frame| match frame {
            Frame::PendingOpen { tag, start } | Frame::Open { tag, start, .. } => {
                Some((tag.as_str(), *start))
            }
            _ => None,
        })
    }

    /// Returns the open tags, outermost first.
    fn context(&self) -> Vec<&str> {
        self.stack
            .iter()
            .filter_map(|frame| match frame {
                Frame::Open { tag, .. } => Some(tag.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Creates a syntax error covering `range`.
    fn error(&self, message: impl Into<String>, range: TokenRange) -> Error {
        let span = match (self.tokens.get(range.start), self.tokens.get(range.end)) {
            (Some(first), Some(last)) => first.span.to(last.span),
            (Some(first), None) => first.span,
            _ => wml_foundation::Span::at_start(),
        };
        let context = self
            .context()
            .into_iter()
            .fold(ErrorContext::new(), |context, tag| context.with_frame(tag));
        Error::syntax(message, span, range).with_context(context)
    }
}

/// Validated properties of one tag.
struct Props(Vec<Property>);

impl Props {
    fn get(&self, key: &str) -> Option<&Property> {
        self.0.iter().find(|p| p.key == key)
    }

    fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|p| match &p.value {
            PropertyValue::Key(s) | PropertyValue::Literal(s) | PropertyValue::Expression(s) => {
                Some(s.clone())
            }
            PropertyValue::Boolean(_) => None,
        })
    }

    fn required_text(&self, key: &str) -> Result<String> {
        self.text(key)
            .ok_or_else(|| Error::internal(format!("validated property '{key}' is missing")))
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|p| match p.value {
            PropertyValue::Boolean(b) => Some(b),
            _ => None,
        })
    }
}

/// Returns the property value a token carries, if any.
fn value_of(kind: &TokenKind) -> Option<PropertyValue> {
    match kind {
        TokenKind::KeyValue(s) => Some(PropertyValue::Key(s.clone())),
        TokenKind::LiteralValue(s) => Some(PropertyValue::Literal(s.clone())),
        TokenKind::ExpressionValue(s) => Some(PropertyValue::Expression(s.clone())),
        _ => None,
    }
}

/// Parses a token stream into top-level nodes.
///
/// # Errors
/// Returns the first syntax error encountered.
pub fn parse(tokens: &[Token]) -> Result<Vec<ParseNode>> {
    Parser::new(tokens).parse_all()
}

/// Tokenizes and parses source text.
///
/// # Errors
/// Returns the first lexical or syntax error.
pub fn parse_source(source: &str) -> Result<Vec<ParseNode>> {
    let tokens = crate::lexer::tokenize(source)?;
    parse(&tokens)
}
