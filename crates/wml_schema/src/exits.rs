//! Exit queries.
//!
//! Exits stay where they were written in the schema tree. These helpers group
//! them by the room they leave from, wherever in the tree they appear.

use std::collections::BTreeMap;

use crate::node::{SchemaExit, SchemaNode};
use crate::visitor::{SchemaVisitor, walk_all};

#[derive(Default)]
struct ExitCollector<'a> {
    exits: Vec<&'a SchemaExit>,
}

impl<'a> ExitCollector<'a> {
    fn collect(&mut self, nodes: &'a [SchemaNode]) {
        for node in nodes {
            match node {
                SchemaNode::Exit(exit) => self.exits.push(exit),
                other => self.collect(other.children()),
            }
        }
    }
}

/// Returns every exit in `nodes`, in document order.
#[must_use]
pub fn all_exits(nodes: &[SchemaNode]) -> Vec<&SchemaExit> {
    let mut collector = ExitCollector::default();
    collector.collect(nodes);
    collector.exits
}

/// Groups every exit in `nodes` by its `from` room.
///
/// Exits written inside a room and exits written at asset level with an
/// explicit `from` land in the same bucket.
#[must_use]
pub fn exits_by_room(nodes: &[SchemaNode]) -> BTreeMap<String, Vec<&SchemaExit>> {
    let mut rooms: BTreeMap<String, Vec<&SchemaExit>> = BTreeMap::new();
    for exit in all_exits(nodes) {
        rooms.entry(exit.from.clone()).or_default().push(exit);
    }
    rooms
}

/// Counts exits per destination room.
#[derive(Debug, Default)]
pub struct EntranceCounter {
    /// Number of exits leading into each room.
    pub entrances: BTreeMap<String, usize>,
}

impl SchemaVisitor for EntranceCounter {
    fn visit_exit(&mut self, exit: &SchemaExit) {
        *self.entrances.entry(exit.to.clone()).or_default() += 1;
    }
}

impl EntranceCounter {
    /// Counts the entrances of every room reachable in `nodes`.
    #[must_use]
    pub fn count(nodes: &[SchemaNode]) -> BTreeMap<String, usize> {
        let mut counter = Self::default();
        walk_all(&mut counter, nodes);
        counter.entrances
    }
}
