//! Schema building for WML.
//!
//! This crate provides:
//! - [`SchemaBuilder`] / [`build_schema`] - Parse tree to schema tree, with
//!   condition chains, resolved exits and flattened messages
//! - [`dependencies`] - Free-variable extraction from embedded expressions
//! - [`visitor`] - Depth-first traversal of schema trees
//! - [`exits`] - Grouping exits by the room they leave from
//! - [`validate`] - Collection of dangling cross-references

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod conditions;
pub mod dependencies;
pub mod exits;
mod messages;
pub mod node;
pub mod validate;
pub mod visitor;

pub use builder::{SchemaBuilder, build_schema};
pub use conditions::ConditionChain;
pub use exits::{all_exits, exits_by_room};
pub use node::{
    ConditionClause, MessageItem, SchemaAction, SchemaAsset, SchemaBookmark, SchemaBookmarkRef,
    SchemaCharacter, SchemaComputed, SchemaCondition, SchemaExit, SchemaFeature, SchemaImage,
    SchemaImport, SchemaLink, SchemaMap, SchemaMessage, SchemaNode, SchemaPronouns, SchemaRoom,
    SchemaStory, SchemaText, SchemaUse, SchemaVariable, detached,
};
pub use validate::{CrossReferences, cross_references};
pub use visitor::{SchemaVisitor, walk_schema};
