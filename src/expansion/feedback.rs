//! Feedback-document centroid construction.

use std::sync::Arc;

use log::{debug, warn};

use crate::backend::{TermVector, TermVectorSource};
use crate::error::Result;
use crate::expansion::bm25::Bm25Weighter;
use crate::expansion::corpus_stats::CorpusStatistics;
use crate::expansion::feature_vector::FeatureVector;

/// The beta-scaled feedback vector and the statistics it was built with.
#[derive(Debug, Clone, Default)]
pub struct Feedback {
    pub vector: FeatureVector,
    pub statistics: CorpusStatistics,
}

/// Builds the beta-weighted feedback vector from feedback documents.
pub struct FeedbackCollector {
    source: Arc<dyn TermVectorSource>,
    weighter: Bm25Weighter,
    beta: f64,
    fb_docs: usize,
}

impl FeedbackCollector {
    /// `fb_docs` is the number of feedback documents that were requested;
    /// it is the divisor of the centroid even when fewer documents come back.
    pub fn new(
        source: Arc<dyn TermVectorSource>,
        weighter: Bm25Weighter,
        beta: f64,
        fb_docs: usize,
    ) -> Self {
        FeedbackCollector {
            source,
            weighter,
            beta,
            fb_docs,
        }
    }

    /// Fetch term vectors for `doc_ids` (in rank order) and fold them into
    /// a feedback vector.
    pub async fn collect(&self, index: &str, doc_ids: &[String], field: &str) -> Result<Feedback> {
        if doc_ids.is_empty() {
            return Ok(self.accumulate(Vec::new()));
        }

        let fetched = self.source.term_vectors(index, doc_ids, field).await?;

        Ok(self.accumulate(align_to_ranking(doc_ids, fetched)))
    }

    /// Fold term vectors into the feedback vector, in the given order.
    ///
    /// Each document is weighted with the statistics observed up to and
    /// including that document; later documents never influence earlier
    /// weights.
    pub fn accumulate(&self, vectors: Vec<TermVector>) -> Feedback {
        let mut statistics = CorpusStatistics::new();
        let mut summed = FeatureVector::new();

        for vector in &vectors {
            statistics.observe(vector);
            let weighted = self.weighter.weight(&vector.raw_vector(), &statistics);
            debug!(
                "feedback document '{}' contributed {} terms",
                vector.id,
                weighted.len()
            );
            summed.merge(&weighted);
        }

        let divisor = self.fb_docs as f64;
        let vector = summed
            .iter()
            .map(|(term, weight)| (term, weight * self.beta / divisor))
            .collect();

        Feedback { vector, statistics }
    }
}

/// Reorder fetched vectors to follow `doc_ids`.
///
/// Ids the source did not answer for get an empty vector.
fn align_to_ranking(doc_ids: &[String], mut fetched: Vec<TermVector>) -> Vec<TermVector> {
    let in_order = fetched.len() == doc_ids.len()
        && fetched.iter().zip(doc_ids).all(|(tv, id)| &tv.id == id);
    if in_order {
        return fetched;
    }

    warn!("term vectors arrived out of rank order, realigning");
    doc_ids
        .iter()
        .map(|id| match fetched.iter().position(|tv| &tv.id == id) {
            Some(pos) => fetched.remove(pos),
            None => TermVector::empty(id.as_str()),
        })
        .collect()
}
