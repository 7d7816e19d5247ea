//! Canonical printer for WML schema trees.
//!
//! This crate provides:
//! - [`print`] / [`print_with_indent`] - Schema nodes back to canonical text
//! - [`print_tagged_message`] - Word-wrap of a single tagged message
//! - [`PrintConfig`] - Indentation and column budget

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod escape;
pub mod printer;
pub mod wrap;

pub use config::PrintConfig;
pub use escape::{escape_literal, escape_text};
pub use printer::{layout, print, print_with_config, print_with_indent};
pub use wrap::{Line, inline_items, print_tagged_message, wrap_items};
