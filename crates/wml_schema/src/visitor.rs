//! Visitor pattern for traversing schema trees.
//!
//! # Example
//!
//! ```
//! use wml_language::parse_source;
//! use wml_schema::{SchemaExit, SchemaVisitor, build_schema, walk_schema};
//!
//! struct ExitCounter(usize);
//!
//! impl SchemaVisitor for ExitCounter {
//!     fn visit_exit(&mut self, _exit: &SchemaExit) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let parsed = parse_source(
//!     "<Asset key=(a)><Room key=(A)><Exit to=(B) /></Room><Room key=(B)><Exit to=(A) /></Room></Asset>",
//! )
//! .unwrap();
//! let schema = build_schema(&parsed).unwrap();
//! let mut counter = ExitCounter(0);
//! for node in &schema {
//!     walk_schema(&mut counter, node);
//! }
//! assert_eq!(counter.0, 2);
//! ```

use crate::node::{
    MessageItem, SchemaBookmarkRef, SchemaCondition, SchemaExit, SchemaLink, SchemaNode,
    SchemaRoom,
};

// =============================================================================
// Read-Only Visitor
// =============================================================================

/// Trait for read-only schema visitors.
///
/// Implement the methods for the nodes of interest; the defaults do nothing.
/// Use [`walk_schema`] to drive the traversal.
#[allow(unused_variables)]
pub trait SchemaVisitor {
    /// Called when entering any schema node.
    fn enter_node(&mut self, node: &SchemaNode) {}

    /// Called when leaving any schema node, after its children.
    fn leave_node(&mut self, node: &SchemaNode) {}

    /// Called before visiting a room's contents.
    fn enter_room(&mut self, room: &SchemaRoom) {}

    /// Called after visiting a room's contents.
    fn leave_room(&mut self, room: &SchemaRoom) {}

    /// Visit an exit.
    fn visit_exit(&mut self, exit: &SchemaExit) {}

    /// Called before visiting the contents of a structural condition.
    fn enter_condition(&mut self, condition: &SchemaCondition<SchemaNode>) {}

    /// Called after visiting the contents of a structural condition.
    fn leave_condition(&mut self, condition: &SchemaCondition<SchemaNode>) {}

    /// Called for every message item, including those nested in conditions.
    fn visit_message_item(&mut self, item: &MessageItem) {}

    /// Visit a link inside a message.
    fn visit_link(&mut self, link: &SchemaLink) {}

    /// Visit a bookmark reference inside a message.
    fn visit_bookmark_ref(&mut self, bookmark: &SchemaBookmarkRef) {}

    /// Called before visiting the contents of an in-message condition.
    fn enter_message_condition(&mut self, condition: &SchemaCondition<MessageItem>) {}

    /// Called after visiting the contents of an in-message condition.
    fn leave_message_condition(&mut self, condition: &SchemaCondition<MessageItem>) {}
}

/// Walk a schema node depth-first.
///
/// For every node this calls `enter_node`, the type-specific hooks, walks
/// child nodes and message items, and finally `leave_node`.
pub fn walk_schema<V: SchemaVisitor + ?Sized>(visitor: &mut V, node: &SchemaNode) {
    visitor.enter_node(node);

    match node {
        SchemaNode::Room(room) => {
            visitor.enter_room(room);
            walk_all(visitor, &room.contents);
            visitor.leave_room(room);
        }
        SchemaNode::Exit(exit) => visitor.visit_exit(exit),
        SchemaNode::Condition(condition) => {
            visitor.enter_condition(condition);
            walk_all(visitor, &condition.contents);
            visitor.leave_condition(condition);
        }
        SchemaNode::Name(message) | SchemaNode::Description(message) => {
            walk_items(visitor, &message.items);
        }
        SchemaNode::Bookmark(bookmark) => walk_items(visitor, &bookmark.items),
        _ => walk_all(visitor, node.children()),
    }

    visitor.leave_node(node);
}

/// Walk several schema nodes in sequence.
pub fn walk_all<V: SchemaVisitor + ?Sized>(visitor: &mut V, nodes: &[SchemaNode]) {
    for node in nodes {
        walk_schema(visitor, node);
    }
}

/// Walk a list of message items.
pub fn walk_items<V: SchemaVisitor + ?Sized>(visitor: &mut V, items: &[MessageItem]) {
    for item in items {
        visitor.visit_message_item(item);
        match item {
            MessageItem::Link(link) => visitor.visit_link(link),
            MessageItem::Bookmark(bookmark) => visitor.visit_bookmark_ref(bookmark),
            MessageItem::Condition(condition) => {
                visitor.enter_message_condition(condition);
                walk_items(visitor, &condition.contents);
                visitor.leave_message_condition(condition);
            }
            MessageItem::String(_) | MessageItem::LineBreak | MessageItem::Space => {}
        }
    }
}

// =============================================================================
// Common Visitors
// =============================================================================

/// Tracks the maximum nesting depth of schema nodes.
#[derive(Debug, Default)]
pub struct DepthCalculator {
    current_depth: usize,
    /// Maximum depth encountered.
    pub max_depth: usize,
}

impl SchemaVisitor for DepthCalculator {
    fn enter_node(&mut self, _node: &SchemaNode) {
        self.current_depth += 1;
        self.max_depth = self.max_depth.max(self.current_depth);
    }

    fn leave_node(&mut self, _node: &SchemaNode) {
        self.current_depth -= 1;
    }
}
