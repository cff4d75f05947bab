//! Rocchio query expansion with BM25 term weighting.
//!
//! # Architecture
//!
//! - [`FeatureVector`]: sparse term → weight container
//! - [`CorpusStatistics`]: request-scoped cache of document frequencies and
//!   corpus totals reported by the backend
//! - [`Bm25Weighter`]: raw term frequencies → BM25 weights
//! - [`FeedbackCollector`]: beta-scaled centroid of the feedback documents
//! - [`RocchioExpander`]: search, collect feedback, weight the query, merge,
//!   clip
//!
//! The query vector is weighted with the statistics returned by the
//! feedback pass, so it cannot be computed before that pass completes.

mod bm25;
mod config;
mod corpus_stats;
mod feature_vector;
mod feedback;
mod rocchio;

pub use bm25::{Bm25Params, Bm25Weighter};
pub use config::{DEFAULT_FIELD, RocchioConfig};
pub use corpus_stats::CorpusStatistics;
pub use feature_vector::{ExpandedTerm, FeatureVector};
pub use feedback::{Feedback, FeedbackCollector};
pub use rocchio::{Expansion, RocchioExpander};
