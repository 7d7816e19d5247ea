//! Tagged-message normalization.
//!
//! Message contents arrive as a sequence of text, whitespace gaps and
//! structured items. Normalization merges text runs, collapses whitespace to
//! single spaces, drops whitespace next to `<br />` and `<Space />`, and (for
//! the outermost message only) trims both ends.

use crate::node::MessageItem;

/// A message piece before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Piece {
    /// Text; any whitespace in it is collapsed too.
    Text(String),
    /// A whitespace run.
    Gap,
    /// A structured item.
    Item(MessageItem),
}

/// Normalizes message pieces into items.
pub(crate) fn normalize(pieces: Vec<Piece>, outermost: bool) -> Vec<MessageItem> {
    let mut items = Vec::new();
    let mut text = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(t) => push_collapsed(&mut text, &t),
            Piece::Gap => push_collapsed(&mut text, " "),
            Piece::Item(item) => {
                if !text.is_empty() {
                    items.push(MessageItem::String(std::mem::take(&mut text)));
                }
                items.push(item);
            }
        }
    }
    if !text.is_empty() {
        items.push(MessageItem::String(text));
    }

    // Whitespace next to a hard break carries no meaning
    for i in 0..items.len() {
        let before_break = matches!(items.get(i + 1), Some(MessageItem::LineBreak | MessageItem::Space));
        let after_break = i > 0 && matches!(items[i - 1], MessageItem::LineBreak | MessageItem::Space);
        if let MessageItem::String(s) = &mut items[i] {
            if before_break {
                s.truncate(s.trim_end().len());
            }
            if after_break {
                *s = s.trim_start().to_string();
            }
        }
    }

    if outermost {
        if let Some(MessageItem::String(s)) = items.first_mut() {
            *s = s.trim_start().to_string();
        }
        if let Some(MessageItem::String(s)) = items.last_mut() {
            s.truncate(s.trim_end().len());
        }
    }

    items.retain(|item| !matches!(item, MessageItem::String(s) if s.is_empty()));
    items
}

/// Collapses whitespace in `text` and returns it trimmed.
pub(crate) fn collapse(text: &str) -> String {
    let mut out = String::new();
    push_collapsed(&mut out, text);
    out.trim().to_string()
}

fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}
