//! # Rocchio
//!
//! Query expansion by pseudo-relevance feedback, with BM25 term weights.
//!
//! A query is run against a search backend, the term vectors of the top
//! documents are BM25-weighted and averaged, and the result is merged with
//! the weighted query to produce a short list of boosted expansion terms.
//!
//! ## Features
//!
//! - Request-scoped corpus statistics with incremental document weighting
//! - Pluggable search and term-vector backends
//! - In-memory backend built from JSON-Lines corpora
//! - Elasticsearch backend over HTTP
//! - REST host and command line interface

pub mod analysis;
pub mod backend;
pub mod cli;
pub mod error;
pub mod expansion;
pub mod server;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
    pub use crate::backend::{
        ElasticsearchBackend, ElasticsearchConfig, MemoryBackend, MemoryIndex, SearchBackend,
        TermVector, TermVectorSource,
    };
    pub use crate::error::{Result, RocchioError};
    pub use crate::expansion::{
        Bm25Params, Bm25Weighter, CorpusStatistics, ExpandedTerm, FeatureVector, RocchioConfig,
        RocchioExpander,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
