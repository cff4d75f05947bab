//! Request-scoped corpus statistics cache.

use ahash::AHashMap;
use log::debug;

use crate::backend::TermVector;
use crate::error::{Result, RocchioError};

/// Corpus statistics gathered while reading feedback documents.
///
/// The backend is the authority on document frequencies and field totals;
/// this type caches what it has reported so far. One instance belongs to a
/// single expansion and is never shared between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStatistics {
    document_count: u64,
    average_document_length: f64,
    document_frequencies: AHashMap<String, u64>,
    observed_documents: usize,
}

impl CorpusStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics with corpus totals already known and no terms observed.
    pub fn from_totals(document_count: u64, sum_total_term_frequency: u64) -> Self {
        let mut stats = Self::new();
        stats.set_totals(document_count, sum_total_term_frequency);
        stats
    }

    /// Cache the document frequencies and corpus totals carried by a
    /// document's term vector.
    ///
    /// Vectors without field statistics (document missing the field) leave
    /// the corpus totals untouched. Reported document frequencies never
    /// lower a previously cached value.
    pub fn observe(&mut self, vector: &TermVector) {
        if let Some(field_stats) = vector.field_statistics {
            self.set_totals(field_stats.doc_count, field_stats.sum_ttf);
        }
        for (term, stats) in &vector.terms {
            self.record_document_frequency(term, stats.doc_freq);
        }
        self.observed_documents += 1;

        debug!(
            "observed document '{}': {} terms, N={}, avgdl={}",
            vector.id,
            vector.terms.len(),
            self.document_count,
            self.average_document_length
        );
    }

    /// Cache a document frequency for `term`, keeping the larger value if
    /// one is already known.
    pub fn record_document_frequency(&mut self, term: &str, document_frequency: u64) {
        match self.document_frequencies.get_mut(term) {
            Some(existing) => *existing = (*existing).max(document_frequency),
            None => {
                self.document_frequencies
                    .insert(term.to_string(), document_frequency);
            }
        }
    }

    fn set_totals(&mut self, document_count: u64, sum_total_term_frequency: u64) {
        self.document_count = document_count;
        self.average_document_length = if document_count == 0 {
            0.0
        } else {
            sum_total_term_frequency as f64 / document_count as f64
        };
    }

    /// Cached document frequency of `term`.
    ///
    /// Fails with [`RocchioError::StatisticUnavailable`] for terms that were
    /// never observed.
    pub fn document_frequency(&self, term: &str) -> Result<u64> {
        self.document_frequencies
            .get(term)
            .copied()
            .ok_or_else(|| RocchioError::statistic_unavailable(term))
    }

    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    pub fn average_document_length(&self) -> f64 {
        self.average_document_length
    }

    /// Number of distinct terms with a cached document frequency.
    pub fn term_count(&self) -> usize {
        self.document_frequencies.len()
    }

    /// Number of term vectors passed to [`CorpusStatistics::observe`].
    pub fn observed_documents(&self) -> usize {
        self.observed_documents
    }

    /// True while no corpus totals are known.
    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}
