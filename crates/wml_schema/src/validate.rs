//! Cross-reference validation.
//!
//! Unlike schema building, which halts at the first problem, this pass
//! collects every unresolved reference in a schema tree. Each top-level
//! Asset or Story is its own namespace: keys defined anywhere inside it, plus
//! the local keys of its imports.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use wml_foundation::{Error, Span, TokenRange};
use wml_language::Token;

use crate::builder::span_of;
use crate::node::{SchemaBookmarkRef, SchemaExit, SchemaLink, SchemaNode, SchemaUse};
use crate::visitor::{SchemaVisitor, walk_all};

/// Keys defined in one namespace, by what defined them.
#[derive(Debug, Default)]
struct Definitions<'a> {
    rooms: BTreeSet<&'a str>,
    bookmarks: BTreeSet<&'a str>,
    /// Every keyed definition except exits.
    all: BTreeSet<&'a str>,
    imports: Vec<&'a SchemaUse>,
}

impl<'a> Definitions<'a> {
    fn collect(nodes: &'a [SchemaNode]) -> Self {
        let mut definitions = Self::default();
        definitions.add(nodes);
        definitions
    }

    fn add(&mut self, nodes: &'a [SchemaNode]) {
        for node in nodes {
            match node {
                SchemaNode::Room(room) => {
                    self.rooms.insert(&room.key);
                }
                SchemaNode::Bookmark(bookmark) => {
                    self.bookmarks.insert(&bookmark.key);
                }
                SchemaNode::Import(import) => self.imports.extend(&import.uses),
                _ => {}
            }
            match (node, node.key()) {
                (SchemaNode::Exit(_), _) | (_, None) => {}
                (_, Some(key)) => {
                    self.all.insert(key);
                }
            }
            self.add(node.children());
        }
    }

    fn is_imported(&self, key: &str) -> bool {
        self.imports.iter().any(|u| u.local_key() == key)
    }

    fn has_room(&self, key: &str) -> bool {
        self.rooms.contains(key) || self.is_imported(key)
    }

    fn has_bookmark(&self, key: &str) -> bool {
        self.bookmarks.contains(key) || self.is_imported(key)
    }

    fn has_any(&self, key: &str) -> bool {
        self.all.contains(key) || self.is_imported(key)
    }
}

/// Collects cross-reference errors for a schema tree.
#[derive(Debug, Default)]
pub struct CrossReferences<'tok> {
    tokens: Option<&'tok [Token]>,
}

impl<'tok> CrossReferences<'tok> {
    /// Creates a new validator.
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

    /// Returns every unresolved reference in `nodes`, in document order.
    #[must_use]
    pub fn check(&self, nodes: &[SchemaNode]) -> Vec<Error> {
        let mut errors = Vec::new();
        for node in nodes {
            let contents = node.children();
            let definitions = Definitions::collect(contents);
            self.check_imports(&definitions, &mut errors);
            let mut checker = ReferenceChecker {
                validator: self,
                definitions: &definitions,
                errors: &mut errors,
            };
            walk_all(&mut checker, contents);
        }
        debug!(errors = errors.len(), "checked cross references");
        errors
    }

    fn check_imports(&self, definitions: &Definitions<'_>, errors: &mut Vec<Error>) {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for import in &definitions.imports {
            let local = import.local_key();
            let count = seen.entry(local).or_default();
            *count += 1;
            if *count == 2 {
                errors.push(self.error(
                    format!("Import '{local}' is imported more than once"),
                    import.source,
                ));
            } else if *count == 1 && definitions.all.contains(local) {
                errors.push(self.error(
                    format!("Import '{local}' collides with a local definition"),
                    import.source,
                ));
            }
        }
    }

    fn error(&self, message: String, source: Option<TokenRange>) -> Error {
        let range = source.unwrap_or(TokenRange::single(0));
        let span = source.map_or_else(Span::at_start, |range| span_of(self.tokens, range));
        Error::semantic(message, span, range)
    }
}

struct ReferenceChecker<'v, 'd, 'tok> {
    validator: &'v CrossReferences<'tok>,
    definitions: &'v Definitions<'d>,
    errors: &'v mut Vec<Error>,
}

impl SchemaVisitor for ReferenceChecker<'_, '_, '_> {
    fn visit_exit(&mut self, exit: &SchemaExit) {
        for (end, room) in [("from", &exit.from), ("to", &exit.to)] {
            if !self.definitions.has_room(room) {
                self.errors.push(self.validator.error(
                    format!("Exit '{}' {end} unknown room '{room}'", exit.key),
                    exit.source,
                ));
            }
        }
    }

    fn visit_link(&mut self, link: &SchemaLink) {
        if !self.definitions.has_any(&link.to) {
            self.errors.push(
                self.validator
                    .error(format!("Link to unknown key '{}'", link.to), link.source),
            );
        }
    }

    fn visit_bookmark_ref(&mut self, bookmark: &SchemaBookmarkRef) {
        if !self.definitions.has_bookmark(&bookmark.key) {
            self.errors.push(self.validator.error(
                format!("Reference to unknown bookmark '{}'", bookmark.key),
                bookmark.source,
            ));
        }
    }
}

/// Returns every dangling exit endpoint, link target, bookmark reference and
/// import collision in `nodes`.
#[must_use]
pub fn cross_references(nodes: &[SchemaNode]) -> Vec<Error> {
    CrossReferences::new().check(nodes)
}
