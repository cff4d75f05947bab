//! Sparse term → weight vectors.

use std::cmp::Ordering;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A term and its weight in an expanded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedTerm {
    pub term: String,
    pub weight: f64,
}

/// A sparse mapping from term to weight.
///
/// Iteration follows first-insertion order until [`FeatureVector::clip`]
/// reorders the surviving terms by descending weight. Adding a term that
/// is already present accumulates its weight.
///
/// # Examples
///
/// ```
/// use rocchio::expansion::FeatureVector;
///
/// let mut v = FeatureVector::new();
/// v.add_term("cat", 1.5);
/// v.add_term("dog", 0.5);
/// v.add_term("cat", 1.0);
///
/// assert_eq!(v.weight("cat"), 2.5);
/// assert_eq!(v.weight("bird"), 0.0);
/// assert_eq!(v.length(), 3.0);
///
/// v.clip(1);
/// assert_eq!(v.terms().collect::<Vec<_>>(), vec!["cat"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    features: IndexMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        FeatureVector {
            features: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        FeatureVector {
            features: IndexMap::with_capacity(capacity),
        }
    }

    /// Add `weight` to `term`, inserting the term if it is new.
    pub fn add_term(&mut self, term: &str, weight: f64) {
        match self.features.get_mut(term) {
            Some(existing) => *existing += weight,
            None => {
                self.features.insert(term.to_string(), weight);
            }
        }
    }

    /// Weight of `term`, or 0 when absent.
    pub fn weight(&self, term: &str) -> f64 {
        self.features.get(term).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.features.contains_key(term)
    }

    /// Sum of all weights.
    pub fn length(&self) -> f64 {
        self.features.values().sum()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.features.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.features.iter().map(|(term, &weight)| (term.as_str(), weight))
    }

    /// Multiply every weight by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for weight in self.features.values_mut() {
            *weight *= factor;
        }
    }

    /// Add every term of `other` into this vector.
    pub fn merge(&mut self, other: &FeatureVector) {
        for (term, weight) in other.iter() {
            self.add_term(term, weight);
        }
    }

    /// Keep only the `k` highest-weighted terms, ordered by descending weight.
    ///
    /// Equal weights keep their current relative order, so clipping is
    /// deterministic and idempotent.
    pub fn clip(&mut self, k: usize) {
        if k >= self.features.len() {
            return;
        }
        let mut entries: Vec<(String, f64)> = self.features.drain(..).collect();
        entries.sort_by(|a, b| descending(a.1, b.1));
        entries.truncate(k);
        self.features = entries.into_iter().collect();
    }

    /// Terms sorted by descending weight, ties in current order.
    pub fn ranked(&self) -> Vec<ExpandedTerm> {
        let mut entries: Vec<ExpandedTerm> = self
            .iter()
            .map(|(term, weight)| ExpandedTerm {
                term: term.to_string(),
                weight,
            })
            .collect();
        entries.sort_by(|a, b| descending(a.weight, b.weight));
        entries
    }

    /// Render as a boosted query string: `term^weight ` for every term,
    /// heaviest first whether or not the vector was clipped.
    pub fn to_boosted_query(&self) -> String {
        boosted_query(&self.ranked())
    }
}

fn boosted_query(terms: &[ExpandedTerm]) -> String {
    let mut query = String::new();
    for ExpandedTerm { term, weight } in terms {
        let _ = write!(query, "{term}^{weight} ");
    }
    query
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        vector.extend(iter);
        vector
    }
}

impl<S: AsRef<str>> Extend<(S, f64)> for FeatureVector {
    fn extend<I: IntoIterator<Item = (S, f64)>>(&mut self, iter: I) {
        for (term, weight) in iter {
            self.add_term(term.as_ref(), weight);
        }
    }
}
