//! Text analysis for query and document text.
//!
//! Query-side term vectors are built by running the raw query through an
//! [`analyzer::Analyzer`]: a tokenizer followed by a chain of token filters.
//! The in-memory backend uses the same pipeline to index documents, so both
//! sides of an expansion agree on what a term is.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
