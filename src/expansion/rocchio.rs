//! Rocchio query expansion.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::backend::{SearchBackend, TermVectorSource, with_timeout};
use crate::error::{Result, RocchioError};
use crate::expansion::bm25::Bm25Weighter;
use crate::expansion::config::RocchioConfig;
use crate::expansion::corpus_stats::CorpusStatistics;
use crate::expansion::feature_vector::FeatureVector;
use crate::expansion::feedback::{Feedback, FeedbackCollector};

/// Everything an expansion produced, for hosts that want more than the
/// final vector.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// The clipped expanded query vector.
    pub vector: FeatureVector,
    /// Feedback document ids in rank order.
    pub feedback_documents: Vec<String>,
    /// Alpha-scaled BM25 query vector that was merged in.
    pub query_vector: FeatureVector,
    /// Corpus statistics after all feedback documents were observed.
    pub statistics: CorpusStatistics,
}

/// Expands queries with pseudo-relevance feedback.
///
/// ```text
/// query ─► search ─► ids ─► term vectors ─► BM25 centroid × β ─┐
///   │                                         (statistics)      ├─► merge ─► clip
///   └────────► analyze ─► BM25 query vector × α ◄───────────────┘
/// ```
///
/// Each call to [`RocchioExpander::expand`] owns its statistics and
/// vectors, so one expander may serve concurrent requests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use rocchio::backend::{MemoryBackend, MemoryIndex};
/// use rocchio::expansion::{RocchioConfig, RocchioExpander};
///
/// # tokio_test::block_on(async {
/// let mut index = MemoryIndex::default();
/// index.add_document("1", [("body", "the cat sat on the mat")]).unwrap();
/// index.add_document("2", [("body", "a dog chased the cat")]).unwrap();
///
/// let backend = Arc::new(MemoryBackend::new().with_index("pets", index));
/// let config = RocchioConfig::default().with_field("body").with_fb_terms(3);
/// let expander = RocchioExpander::with_backend(backend, config).unwrap();
///
/// let expanded = expander.expand("pets", "cat").await.unwrap();
/// assert!(expanded.len() <= 3);
/// # });
/// ```
pub struct RocchioExpander {
    search: Arc<dyn SearchBackend>,
    term_vectors: Arc<dyn TermVectorSource>,
    analyzer: Arc<dyn Analyzer>,
    config: RocchioConfig,
}

impl RocchioExpander {
    /// Create an expander after validating `config`.
    pub fn new(
        search: Arc<dyn SearchBackend>,
        term_vectors: Arc<dyn TermVectorSource>,
        config: RocchioConfig,
    ) -> Result<Self> {
        config.validate()?;
        let analyzer = if config.stop_words {
            StandardAnalyzer::with_stop_words()
        } else {
            StandardAnalyzer::new()
        };
        Ok(RocchioExpander {
            search,
            term_vectors,
            analyzer: Arc::new(analyzer),
            config,
        })
    }

    /// Create an expander over a backend that serves both searches and
    /// term vectors.
    pub fn with_backend<B>(backend: Arc<B>, config: RocchioConfig) -> Result<Self>
    where
        B: SearchBackend + TermVectorSource + 'static,
    {
        Self::new(backend.clone(), backend, config)
    }

    pub fn config(&self) -> &RocchioConfig {
        &self.config
    }

    /// Expand `query` against `index`, returning at most `fbTerms` weighted
    /// terms.
    pub async fn expand(&self, index: &str, query: &str) -> Result<FeatureVector> {
        Ok(self.expand_detailed(index, query).await?.vector)
    }

    /// Expand `query` and keep the intermediate artifacts.
    ///
    /// `RocchioConfig::timeout` bounds the whole expansion, search and term
    /// vector requests together.
    pub async fn expand_detailed(&self, index: &str, query: &str) -> Result<Expansion> {
        with_timeout(self.config.timeout, "expansion", self.run(index, query)).await
    }

    async fn run(&self, index: &str, query: &str) -> Result<Expansion> {
        let config = &self.config;
        let weighter = Bm25Weighter::new(config.bm25_params());

        let feedback_documents = self.search.search(index, query, config.fb_docs).await?;
        debug!(
            "search backend '{}' returned {} of {} requested feedback documents",
            self.search.name(),
            feedback_documents.len(),
            config.fb_docs
        );

        if feedback_documents.is_empty() {
            if config.require_feedback {
                return Err(RocchioError::no_results(format!(
                    "query '{query}' matched no documents in '{index}'"
                )));
            }
            warn!("query '{query}' matched no documents in '{index}', expanding from query alone");
        }

        let collector = FeedbackCollector::new(
            self.term_vectors.clone(),
            weighter,
            config.beta,
            config.fb_docs,
        );
        let Feedback {
            vector: mut expanded,
            statistics,
        } = collector
            .collect(index, &feedback_documents, &config.field)
            .await?;

        let query_vector = self.query_vector(query, &weighter, &statistics)?;
        for (term, weight) in query_vector.iter() {
            expanded.add_term(term, weight);
        }
        expanded.clip(config.fb_terms);

        info!(
            "expanded '{}' with {} feedback documents into {} terms",
            query,
            feedback_documents.len(),
            expanded.len()
        );

        Ok(Expansion {
            vector: expanded,
            feedback_documents,
            query_vector,
            statistics,
        })
    }

    /// Name of the analyzer applied to queries.
    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    /// Raw term-frequency vector of `query` as produced by the analyzer.
    pub fn raw_query_vector(&self, query: &str) -> Result<FeatureVector> {
        Ok(self
            .analyzer
            .terms(query)?
            .into_iter()
            .map(|term| (term, 1.0))
            .collect())
    }

    /// Alpha-scaled BM25 query vector. Takes the statistics finalized by
    /// the feedback pass.
    fn query_vector(
        &self,
        query: &str,
        weighter: &Bm25Weighter,
        statistics: &CorpusStatistics,
    ) -> Result<FeatureVector> {
        let raw = self.raw_query_vector(query)?;
        let weighted = weighter.weight(&raw, statistics);
        Ok(weighted
            .iter()
            .map(|(term, weight)| (term, weight * self.config.alpha))
            .collect())
    }
}
