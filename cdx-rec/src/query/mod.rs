//! Query interpretation
//!
//! Deterministic natural-language → [`QueryIntent`] mapping: vocabulary
//! lookups against static lexicons plus numeric pattern extraction. No
//! randomness, no external state; identical input always yields an identical
//! intent.
//!
//! [`QueryIntent`]: cdx_common::intent::QueryIntent

pub mod lexicon;
mod parser;

pub use parser::QueryInterpreter;
