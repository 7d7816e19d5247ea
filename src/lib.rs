//! WML - front end for the WML asset markup language
//!
//! This crate re-exports all layers of the WML front end and adds helpers
//! that run the whole pipeline. For detailed documentation, see the
//! individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: wml_printer    - Canonical printer, word-wrap
//! Layer 2: wml_schema     - Schema builder, condition chains, exits, validation
//! Layer 1: wml_language   - Tokenizer, tag grammars, stack parser
//! Layer 0: wml_foundation - Spans, token ranges, errors
//! ```
//!
//! # Example
//!
//! ```
//! let canonical = wml::format("<Asset key=(Test)>\n  <Room key=(VORTEX)></Room>\n</Asset>").unwrap();
//! assert_eq!(canonical, "<Asset key=(Test)><Room key=(VORTEX) /></Asset>");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use wml_foundation as foundation;
pub use wml_language as language;
pub use wml_printer as printer;
pub use wml_schema as schema;

use tracing::debug;
use wml_foundation::{Error, ErrorContext, Result};
use wml_printer::PrintConfig;
use wml_schema::{SchemaBuilder, SchemaNode};

/// Tokenizes, parses and builds the schema for `source`.
///
/// # Errors
/// Returns the first lexical, syntax or semantic error, with the offending
/// source line attached to its context.
pub fn compile(source: &str) -> Result<Vec<SchemaNode>> {
    let tokens = wml_language::tokenize(source).map_err(|e| locate(e, source))?;
    let nodes = wml_language::parse(&tokens).map_err(|e| locate(e, source))?;
    let schema = SchemaBuilder::new()
        .with_tokens(&tokens)
        .build(&nodes)
        .map_err(|e| locate(e, source))?;
    debug!(bytes = source.len(), nodes = schema.len(), "compiled source");
    Ok(schema)
}

/// Rewrites `source` in canonical form.
///
/// # Errors
/// Returns the first error found compiling `source`.
pub fn format(source: &str) -> Result<String> {
    format_with_config(source, &PrintConfig::default())
}

/// Rewrites `source` in canonical form using `config`.
///
/// # Errors
/// Returns the first error found compiling `source`.
pub fn format_with_config(source: &str, config: &PrintConfig) -> Result<String> {
    let schema = compile(source)?;
    Ok(wml_printer::print_with_config(&schema, config))
}

/// Attaches the source line an error points at, keeping any tag stack.
fn locate(mut error: Error, source: &str) -> Error {
    let Some(span) = error.span() else {
        return error;
    };
    let located = ErrorContext::for_span(source, span);
    let context = match error.context.take() {
        Some(mut context) => {
            context.line_text = located.line_text;
            context
        }
        None => located,
    };
    error.with_context(context)
}
