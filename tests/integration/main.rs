//! Cross-layer integration tests for WML
//!
//! Tests that run source text through every layer, from tokens to canonical
//! output.

mod pipeline;
mod round_trip;
