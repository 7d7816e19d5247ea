//! Source spans, token ranges, and error types for the WML front end.
//!
//! This crate provides:
//! - [`Span`] - Byte ranges with line/column for error reporting
//! - [`TokenRange`] - Inclusive token-index ranges used as back-references
//! - [`Error`] - Lexical, syntactic and semantic errors with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod span;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use span::{Span, TokenRange};
