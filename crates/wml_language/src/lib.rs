//! Tokenizer, tag grammars, and stack parser for WML.
//!
//! This crate provides:
//! - [`Lexer`] / [`tokenize`] - Two-mode tokenization of WML source
//! - [`expression`] - Brace balancing and coarse lexing of embedded expressions
//! - [`grammar`] - Per-tag property and child rules
//! - [`Parser`] / [`parse`] - Assembly of tokens into a validated [`ParseNode`] tree

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod expression;
pub mod grammar;
pub mod lexer;
pub mod parse_node;
pub mod parser;
pub mod token;

pub use grammar::{PropertyValue, TagGrammar, ValueKind, grammar_for};
pub use lexer::{Lexer, tokenize};
pub use parse_node::{ConditionKind, ParseNode, ParseTag, Pronouns};
pub use parser::{Parser, Property, parse, parse_source};
pub use token::{Token, TokenKind};
