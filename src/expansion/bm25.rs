//! BM25 term weighting for feature vectors.
//!
//! For a raw term-frequency vector `v` and corpus statistics `s`:
//!
//! ```text
//! idf  = ln((N + 1) / (df + 0.5))
//! w(t) = idf * k1 * tf / (tf + k1 * (1 - b + b * |v| / avgdl))
//! ```
//!
//! where `|v|` is the sum of the raw frequencies in `v`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RocchioError};
use crate::expansion::corpus_stats::CorpusStatistics;
use crate::expansion::feature_vector::FeatureVector;

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation (> 0).
    pub k1: f64,
    /// Length normalisation strength, within [0, 1].
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Self {
        Bm25Params { k1, b }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 <= 0.0 {
            return Err(RocchioError::invalid_config(format!(
                "k1 must be a positive number, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(RocchioError::invalid_config(format!(
                "b must be within [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

/// Maps raw term-frequency vectors to BM25-weighted vectors.
///
/// Stateless apart from its parameters; every call reads only the
/// statistics it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bm25Weighter {
    params: Bm25Params,
}

impl Bm25Weighter {
    pub fn new(params: Bm25Params) -> Self {
        Bm25Weighter { params }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Inverse document frequency of a term with document frequency `df`.
    pub fn idf(&self, document_frequency: u64, stats: &CorpusStatistics) -> f64 {
        ((stats.document_count() + 1) as f64 / (document_frequency as f64 + 0.5)).ln()
    }

    /// BM25 weight of one term occurring `tf` times in a vector of total
    /// length `vector_length`.
    pub fn term_weight(
        &self,
        tf: f64,
        vector_length: f64,
        document_frequency: u64,
        stats: &CorpusStatistics,
    ) -> f64 {
        let avgdl = stats.average_document_length();
        if stats.document_count() == 0 || avgdl <= 0.0 || avgdl.is_nan() {
            return 0.0;
        }
        let Bm25Params { k1, b } = self.params;
        let idf = self.idf(document_frequency, stats);

        (idf * k1 * tf) / (tf + k1 * (1.0 - b + b * vector_length / avgdl))
    }

    /// Weight every term of `raw` against `stats`.
    ///
    /// Terms without a cached document frequency are weighted as if no
    /// document contained them (df = 0).
    pub fn weight(&self, raw: &FeatureVector, stats: &CorpusStatistics) -> FeatureVector {
        let vector_length = raw.length();
        let mut weighted = FeatureVector::with_capacity(raw.len());

        for (term, tf) in raw.iter() {
            let df = match stats.document_frequency(term) {
                Ok(df) => df,
                Err(_) => {
                    debug!("no document frequency for '{term}', using df=0");
                    0
                }
            };
            weighted.add_term(term, self.term_weight(tf, vector_length, df, stats));
        }

        weighted
    }
}
