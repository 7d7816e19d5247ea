//! Word-wrap for tagged messages.
//!
//! A message is cut into groups of items that must stay on one line: words
//! of text and any tags touching them with no whitespace in between. The
//! words of link text and of condition contents are grouped the same way,
//! so a long link or condition may break between its words. Groups are
//! packed greedily into the column budget, breaking only where the source
//! had whitespace or next to `<br />` and `<Space />`.
//!
//! A condition whose contents start and end with whitespace can also be laid
//! out nested, its contents on their own indented lines. Nesting is only
//! used when some group containing such a condition cannot fit on a line of
//! its own; the whole message is then re-packed with every such condition
//! nested.

use tracing::trace;
use wml_language::ConditionKind;
use wml_schema::{MessageItem, SchemaCondition};

use crate::config::PrintConfig;
use crate::escape::escape_text;

/// One output line before indentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// Indentation depth.
    pub depth: usize,
    /// Line content.
    pub text: String,
}

impl Line {
    /// Creates a line at `depth`.
    #[must_use]
    pub fn new(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
        }
    }

    /// Returns the content width in characters.
    #[must_use]
    pub fn width(&self) -> usize {
        width(&self.text)
    }
}

/// Returns the display width of `text` in characters.
///
/// Text spanning several lines is as wide as its widest line.
pub(crate) fn width(text: &str) -> usize {
    text.split('\n')
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

// =============================================================================
// Inline Rendering
// =============================================================================

/// Renders message items on a single line.
#[must_use]
pub fn inline_items(items: &[MessageItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&inline_item(item));
    }
    out
}

fn inline_item(item: &MessageItem) -> String {
    match item {
        MessageItem::String(text) => escape_text(text),
        MessageItem::Link(link) if link.text.is_empty() => format!("<Link to=({}) />", link.to),
        MessageItem::Link(link) => {
            format!("<Link to=({})>{}</Link>", link.to, escape_text(&link.text))
        }
        MessageItem::LineBreak => "<br />".to_string(),
        MessageItem::Space => "<Space />".to_string(),
        MessageItem::Bookmark(bookmark) => format!("<Bookmark key=({}) />", bookmark.key),
        MessageItem::Condition(condition) if condition.contents.is_empty() => {
            format!("<{} />", condition_head(condition))
        }
        MessageItem::Condition(condition) => format!(
            "<{}>{}</{}>",
            condition_head(condition),
            inline_items(&condition.contents),
            condition.kind.name()
        ),
    }
}

/// Returns a condition's tag name and expression, e.g. `If {a && b}`.
pub(crate) fn condition_head<T>(condition: &SchemaCondition<T>) -> String {
    match condition.kind {
        ConditionKind::If | ConditionKind::ElseIf => format!(
            "{} {{{}}}",
            condition.kind.name(),
            condition
                .own_clause()
                .map_or("", |clause| clause.if_expression.as_str())
        ),
        ConditionKind::Else => condition.kind.name().to_string(),
    }
}

/// Returns the contents of a condition that may be laid out nested, with the
/// edge whitespace removed, or `None` if it cannot be nested.
fn nestable(condition: &SchemaCondition<MessageItem>) -> Option<Vec<MessageItem>> {
    let contents = &condition.contents;
    let starts = matches!(contents.first(), Some(MessageItem::String(s)) if s.starts_with(' '));
    let ends = matches!(contents.last(), Some(MessageItem::String(s)) if s.ends_with(' '));
    if !starts || !ends {
        return None;
    }
    let mut inner = contents.clone();
    if let Some(MessageItem::String(s)) = inner.first_mut() {
        *s = s.trim_start().to_string();
    }
    if let Some(MessageItem::String(s)) = inner.last_mut() {
        s.truncate(s.trim_end().len());
    }
    inner.retain(|item| !matches!(item, MessageItem::String(s) if s.is_empty()));
    (!inner.is_empty()).then_some(inner)
}

// =============================================================================
// Grouping
// =============================================================================

/// What separates a group from the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Join {
    /// Nothing; a line may still break here (next to a hard break).
    Tight,
    /// A single space.
    Space,
}

impl Join {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Tight => "",
            Self::Space => " ",
        }
    }
}

#[derive(Debug)]
enum Atom<'a> {
    Text(String),
    Nestable {
        condition: &'a SchemaCondition<MessageItem>,
        inner: Vec<MessageItem>,
    },
}

impl Atom<'_> {
    fn inline(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Nestable { condition, .. } => {
                inline_item(&MessageItem::Condition((*condition).clone()))
            }
        }
    }
}

#[derive(Debug)]
struct Group<'a> {
    join: Join,
    atoms: Vec<Atom<'a>>,
}

impl Group<'_> {
    fn inline_width(&self) -> usize {
        self.atoms.iter().map(|atom| width(&atom.inline())).sum()
    }

    fn has_nestable(&self) -> bool {
        self.atoms
            .iter()
            .any(|atom| matches!(atom, Atom::Nestable { .. }))
    }

    /// Width up to and including the first nested opening tag.
    fn head_width(&self) -> usize {
        let mut total = 0;
        for atom in &self.atoms {
            match atom {
                Atom::Text(text) => total += width(text),
                Atom::Nestable { condition, .. } => {
                    return total + width(&condition_head(condition)) + 2;
                }
            }
        }
        total
    }
}

#[derive(Default)]
struct Grouper<'a> {
    groups: Vec<Group<'a>>,
    atoms: Vec<Atom<'a>>,
    join: Option<Join>,
}

impl<'a> Grouper<'a> {
    fn split(&mut self, join: Join) {
        if self.atoms.is_empty() {
            self.join = Some(self.join.map_or(join, |j| j.max(join)));
        } else {
            self.groups.push(Group {
                join: self.join.unwrap_or(Join::Tight),
                atoms: std::mem::take(&mut self.atoms),
            });
            self.join = Some(join);
        }
    }

    fn push(&mut self, atom: Atom<'a>) {
        self.atoms.push(atom);
    }

    fn finish(mut self) -> Vec<Group<'a>> {
        self.split(Join::Tight);
        self.groups
    }
}

fn groups(items: &[MessageItem]) -> Vec<Group<'_>> {
    let mut grouper = Grouper::default();
    push_items(&mut grouper, items);
    grouper.finish()
}

fn push_items<'a>(grouper: &mut Grouper<'a>, items: &'a [MessageItem]) {
    for item in items {
        match item {
            MessageItem::String(text) => push_words(grouper, text),
            MessageItem::LineBreak | MessageItem::Space => {
                grouper.split(Join::Tight);
                grouper.push(Atom::Text(inline_item(item)));
                grouper.split(Join::Tight);
            }
            MessageItem::Condition(condition) if condition.contents.is_empty() => {
                grouper.push(Atom::Text(inline_item(item)));
            }
            MessageItem::Condition(condition) => match nestable(condition) {
                Some(inner) => grouper.push(Atom::Nestable { condition, inner }),
                None => {
                    // Breaks inside fall where the contents had whitespace
                    grouper.push(Atom::Text(format!("<{}>", condition_head(condition))));
                    push_items(grouper, &condition.contents);
                    grouper.push(Atom::Text(format!("</{}>", condition.kind.name())));
                }
            },
            MessageItem::Link(link) if !link.text.is_empty() => {
                grouper.push(Atom::Text(format!("<Link to=({})>", link.to)));
                push_words(grouper, &link.text);
                grouper.push(Atom::Text("</Link>".to_string()));
            }
            MessageItem::Link(_) | MessageItem::Bookmark(_) => {
                grouper.push(Atom::Text(inline_item(item)));
            }
        }
    }
}

fn push_words(grouper: &mut Grouper<'_>, text: &str) {
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            grouper.split(Join::Space);
        }
        if !word.is_empty() {
            grouper.push(Atom::Text(escape_text(word)));
        }
    }
}

// =============================================================================
// Packing
// =============================================================================

/// Signals that a group overflowed and nesting its conditions would help.
struct NeedsForce;

struct Packer<'c> {
    config: &'c PrintConfig,
    depth: usize,
    force: bool,
    lines: Vec<Line>,
    current: String,
}

impl<'c> Packer<'c> {
    fn new(config: &'c PrintConfig, depth: usize, force: bool) -> Self {
        Self {
            config,
            depth,
            force,
            lines: Vec::new(),
            current: String::new(),
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.current);
        self.lines.push(Line::new(self.depth, text));
    }

    fn pack(mut self, groups: Vec<Group<'_>>) -> Result<Vec<Line>, NeedsForce> {
        let budget = self.config.budget(self.depth);
        for group in groups {
            let needed = if self.force {
                group.head_width()
            } else {
                group.inline_width()
            };
            let mut join = group.join.as_str();
            if !self.current.is_empty() && width(&self.current) + join.len() + needed > budget {
                self.flush();
            }
            if self.current.is_empty() {
                join = "";
                if needed > budget && !self.force && group.has_nestable() {
                    return Err(NeedsForce);
                }
            }
            self.current.push_str(join);
            for atom in group.atoms {
                match atom {
                    Atom::Nestable { condition, inner } if self.force => {
                        self.current.push('<');
                        self.current.push_str(&condition_head(condition));
                        self.current.push('>');
                        self.flush();
                        self.lines.extend(wrap_items(&inner, self.depth + 1, self.config));
                        self.current = format!("</{}>", condition.kind.name());
                    }
                    atom => self.current.push_str(&atom.inline()),
                }
            }
        }
        if !self.current.is_empty() {
            self.flush();
        }
        Ok(self.lines)
    }
}

/// Wraps message items into lines at `depth`.
#[must_use]
pub fn wrap_items(items: &[MessageItem], depth: usize, config: &PrintConfig) -> Vec<Line> {
    match Packer::new(config, depth, false).pack(groups(items)) {
        Ok(lines) => lines,
        Err(NeedsForce) => {
            trace!(depth, "re-packing message with nested conditions");
            Packer::new(config, depth, true)
                .pack(groups(items))
                .unwrap_or_default()
        }
    }
}

/// Renders a tagged message on its own, wrapped at `depth`.
///
/// Lines are indented for `depth` and joined with newlines.
#[must_use]
pub fn print_tagged_message(items: &[MessageItem], depth: usize, config: &PrintConfig) -> String {
    render_lines(&wrap_items(items, depth, config), config)
}

/// Indents and joins lines.
#[must_use]
pub fn render_lines(lines: &[Line], config: &PrintConfig) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&config.indent(line.depth));
        out.push_str(&line.text);
    }
    out
}
