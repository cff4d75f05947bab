//! Data returned by the term-statistics collaborator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expansion::FeatureVector;

/// Per-term statistics for one document field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatistics {
    /// Occurrences of the term in this document's field.
    pub term_freq: u64,
    /// Number of documents in the corpus whose field contains the term.
    pub doc_freq: u64,
}

/// Corpus-level statistics for a field, as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// Number of documents in the corpus that have the field.
    pub doc_count: u64,
    /// Sum of total term frequency over the field across the corpus.
    pub sum_ttf: u64,
}

impl FieldStatistics {
    pub fn new(doc_count: u64, sum_ttf: u64) -> Self {
        FieldStatistics { doc_count, sum_ttf }
    }
}

/// Raw term vector of one document field.
///
/// `field_statistics` is `None` when the document does not have the
/// requested field (or does not exist); such a vector carries no terms and
/// no corpus totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermVector {
    /// Document identifier.
    pub id: String,
    /// Terms in backend order with their statistics.
    pub terms: IndexMap<String, TermStatistics>,
    /// Corpus totals for the field.
    pub field_statistics: Option<FieldStatistics>,
}

impl TermVector {
    /// A vector with corpus totals and no terms yet.
    pub fn new<S: Into<String>>(id: S, field_statistics: FieldStatistics) -> Self {
        TermVector {
            id: id.into(),
            terms: IndexMap::new(),
            field_statistics: Some(field_statistics),
        }
    }

    /// The vector of a document that lacks the requested field.
    pub fn empty<S: Into<String>>(id: S) -> Self {
        TermVector {
            id: id.into(),
            terms: IndexMap::new(),
            field_statistics: None,
        }
    }

    /// Add a term, builder style.
    pub fn with_term<S: Into<String>>(mut self, term: S, term_freq: u64, doc_freq: u64) -> Self {
        self.terms.insert(
            term.into(),
            TermStatistics {
                term_freq,
                doc_freq,
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term frequencies as a raw feature vector, preserving term order.
    pub fn raw_vector(&self) -> FeatureVector {
        self.terms
            .iter()
            .map(|(term, stats)| (term.as_str(), stats.term_freq as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_vector_keeps_term_order() {
        let tv = TermVector::new("doc1", FieldStatistics::new(2, 30))
            .with_term("zebra", 1, 1)
            .with_term("apple", 4, 2);

        let raw = tv.raw_vector();
        let terms: Vec<&str> = raw.terms().collect();
        assert_eq!(terms, vec!["zebra", "apple"]);
        assert_eq!(raw.weight("apple"), 4.0);
        assert_eq!(raw.length(), 5.0);
    }

    #[test]
    fn test_empty_vector() {
        let tv = TermVector::empty("missing");
        assert!(tv.is_empty());
        assert_eq!(tv.field_statistics, None);
        assert!(tv.raw_vector().is_empty());
    }
}
