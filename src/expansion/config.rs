//! Expansion parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RocchioError};
use crate::expansion::bm25::Bm25Params;

/// Default field: Elasticsearch's catch-all `_all` field.
pub const DEFAULT_FIELD: &str = "_all";

/// Parameters of one Rocchio expansion.
///
/// # Example
///
/// ```
/// use rocchio::expansion::RocchioConfig;
///
/// let config = RocchioConfig::default()
///     .with_field("text")
///     .with_fb_docs(5)
///     .with_fb_terms(20);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.alpha, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RocchioConfig {
    /// Field whose term vectors feed the expansion.
    pub field: String,
    /// Weight of the original query vector.
    pub alpha: f64,
    /// Weight of the feedback centroid.
    pub beta: f64,
    /// BM25 term-frequency saturation.
    pub k1: f64,
    /// BM25 length normalisation.
    pub b: f64,
    /// Number of feedback documents requested from the search backend.
    pub fb_docs: usize,
    /// Number of expansion terms kept.
    pub fb_terms: usize,
    /// Deadline for the whole expansion, covering the search and the term
    /// vector requests.
    #[serde(skip)]
    pub timeout: Option<Duration>,
    /// Drop English stop words from the query before weighting it.
    pub stop_words: bool,
    /// Fail with `NoResults` instead of falling back to the query vector
    /// when the feedback query matches nothing.
    pub require_feedback: bool,
}

impl Default for RocchioConfig {
    fn default() -> Self {
        RocchioConfig {
            field: DEFAULT_FIELD.to_string(),
            alpha: 0.5,
            beta: 0.5,
            k1: 1.2,
            b: 0.75,
            fb_docs: 10,
            fb_terms: 10,
            timeout: None,
            stop_words: false,
            require_feedback: false,
        }
    }
}

impl RocchioConfig {
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_bm25(mut self, k1: f64, b: f64) -> Self {
        self.k1 = k1;
        self.b = b;
        self
    }

    pub fn with_fb_docs(mut self, fb_docs: usize) -> Self {
        self.fb_docs = fb_docs;
        self
    }

    pub fn with_fb_terms(mut self, fb_terms: usize) -> Self {
        self.fb_terms = fb_terms;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_stop_words(mut self, stop_words: bool) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_require_feedback(mut self, require_feedback: bool) -> Self {
        self.require_feedback = require_feedback;
        self
    }

    pub fn bm25_params(&self) -> Bm25Params {
        Bm25Params::new(self.k1, self.b)
    }

    /// Reject malformed parameters before any collaborator is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.field.trim().is_empty() {
            return Err(RocchioError::invalid_config("field must not be empty"));
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RocchioError::invalid_config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        self.bm25_params().validate()?;
        if self.fb_docs == 0 {
            return Err(RocchioError::invalid_config("fbDocs must be positive"));
        }
        if self.fb_terms == 0 {
            return Err(RocchioError::invalid_config("fbTerms must be positive"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(RocchioError::invalid_config("timeout must be positive"));
        }
        Ok(())
    }
}
