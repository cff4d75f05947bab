//! In-process search backend.
//!
//! [`MemoryIndex`] keeps per-field term frequencies for a small document
//! collection and answers both collaborator roles: BM25 search over the
//! virtual `_all` field, and term vectors with corpus statistics. It is
//! meant for local corpora, demos and tests; production deployments use
//! [`super::ElasticsearchBackend`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;

use super::types::{FieldStatistics, TermStatistics, TermVector};
use super::{SearchBackend, TermVectorSource};
use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::error::{Result, RocchioError};
use crate::expansion::Bm25Params;

/// Virtual field holding the terms of every field of a document.
pub const ALL_FIELD: &str = "_all";

#[derive(Debug, Default)]
struct FieldIndex {
    doc_freqs: AHashMap<String, u64>,
    doc_count: u64,
    sum_ttf: u64,
}

#[derive(Debug)]
struct StoredDocument {
    id: String,
    /// field -> term -> frequency
    fields: AHashMap<String, AHashMap<String, u64>>,
}

impl StoredDocument {
    fn field_length(&self, field: &str) -> u64 {
        self.fields
            .get(field)
            .map(|terms| terms.values().sum())
            .unwrap_or(0)
    }
}

/// An analyzed, in-memory document collection.
pub struct MemoryIndex {
    analyzer: Arc<dyn Analyzer>,
    documents: Vec<StoredDocument>,
    positions: AHashMap<String, usize>,
    fields: AHashMap<String, FieldIndex>,
    bm25: Bm25Params,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new(Arc::new(StandardAnalyzer::new()))
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("analyzer", &self.analyzer.name())
            .field("documents", &self.documents.len())
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl MemoryIndex {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        MemoryIndex {
            analyzer,
            documents: Vec::new(),
            positions: AHashMap::new(),
            fields: AHashMap::new(),
            bm25: Bm25Params::default(),
        }
    }

    /// BM25 parameters used to rank search results.
    pub fn with_bm25(mut self, bm25: Bm25Params) -> Self {
        self.bm25 = bm25;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Analyze and add a document. Every field is also indexed into `_all`.
    pub fn add_document<I, K, V>(&mut self, id: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if self.positions.contains_key(id) {
            return Err(RocchioError::other(format!("duplicate document id '{id}'")));
        }

        let mut analyzed: AHashMap<String, AHashMap<String, u64>> = AHashMap::new();
        for (field, text) in fields {
            let field = field.as_ref();
            if field == ALL_FIELD {
                return Err(RocchioError::other(format!(
                    "field name '{ALL_FIELD}' is reserved"
                )));
            }
            for term in self.analyzer.terms(text.as_ref())? {
                *analyzed
                    .entry(field.to_string())
                    .or_default()
                    .entry(term.clone())
                    .or_insert(0) += 1;
                *analyzed
                    .entry(ALL_FIELD.to_string())
                    .or_default()
                    .entry(term)
                    .or_insert(0) += 1;
            }
        }

        for (field, terms) in &analyzed {
            let index = self.fields.entry(field.clone()).or_default();
            index.doc_count += 1;
            for (term, freq) in terms {
                index.sum_ttf += freq;
                *index.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
        }

        self.positions.insert(id.to_string(), self.documents.len());
        self.documents.push(StoredDocument {
            id: id.to_string(),
            fields: analyzed,
        });
        Ok(())
    }

    /// Load documents from a JSON-Lines file.
    pub fn from_jsonl_file<P: AsRef<Path>>(path: P, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let index = Self::from_jsonl(BufReader::new(file), analyzer)?;
        info!(
            "loaded {} documents from {}",
            index.len(),
            path.as_ref().display()
        );
        Ok(index)
    }

    /// Load documents from JSON Lines: one object per line with an `id`
    /// and any number of text fields. Arrays of strings are joined with
    /// spaces; other values are ignored. Lines without an `id` use their
    /// 1-based line number.
    pub fn from_jsonl<R: BufRead>(reader: R, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let mut index = Self::new(analyzer);

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line).map_err(|e| {
                RocchioError::other(format!("invalid document on line {}: {e}", line_num + 1))
            })?;
            let Value::Object(object) = value else {
                return Err(RocchioError::other(format!(
                    "line {} is not a JSON object",
                    line_num + 1
                )));
            };

            let id = match object.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => (line_num + 1).to_string(),
            };

            let fields: Vec<(String, String)> = object
                .iter()
                .filter(|(key, _)| key.as_str() != "id")
                .filter_map(|(key, value)| field_text(value).map(|text| (key.clone(), text)))
                .collect();

            index.add_document(&id, fields)?;
        }

        Ok(index)
    }

    /// Corpus totals of `field`, if any document has it.
    pub fn field_statistics(&self, field: &str) -> Option<FieldStatistics> {
        self.fields
            .get(field)
            .map(|index| FieldStatistics::new(index.doc_count, index.sum_ttf))
    }

    /// Rank documents by BM25 over `_all`. Ties keep insertion order.
    pub fn search_ids(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let Some(all) = self.fields.get(ALL_FIELD) else {
            return Ok(Vec::new());
        };

        let mut query_terms = self.analyzer.terms(query)?;
        let mut seen = AHashSet::new();
        query_terms.retain(|term| seen.insert(term.clone()));

        let n = all.doc_count as f64;
        let avgdl = all.sum_ttf as f64 / n;
        let Bm25Params { k1, b } = self.bm25;

        let mut scored: Vec<(usize, f64)> = Vec::new();
        for (position, doc) in self.documents.iter().enumerate() {
            let Some(terms) = doc.fields.get(ALL_FIELD) else {
                continue;
            };
            let dl = doc.field_length(ALL_FIELD) as f64;
            let mut score = 0.0;
            let mut matched = false;
            for term in &query_terms {
                let Some(&tf) = terms.get(term) else {
                    continue;
                };
                matched = true;
                let df = all.doc_freqs.get(term).copied().unwrap_or(0) as f64;
                let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
                let tf = tf as f64;
                score += idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * dl / avgdl));
            }
            if matched {
                scored.push((position, score));
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        debug!("'{query}' matched {} documents", scored.len());

        Ok(scored
            .into_iter()
            .map(|(position, _)| self.documents[position].id.clone())
            .collect())
    }

    /// Term vector of `field` in document `id`, terms in lexicographic order.
    pub fn document_term_vector(&self, id: &str, field: &str) -> TermVector {
        let Some(doc) = self.positions.get(id).map(|&pos| &self.documents[pos]) else {
            warn!("term vector requested for unknown document '{id}'");
            return TermVector::empty(id);
        };
        let (Some(terms), Some(field_index)) = (doc.fields.get(field), self.fields.get(field))
        else {
            return TermVector::empty(id);
        };

        let sorted: BTreeMap<&String, &u64> = terms.iter().collect();
        let mut vector = TermVector::new(
            id,
            FieldStatistics::new(field_index.doc_count, field_index.sum_ttf),
        );
        for (term, &term_freq) in sorted {
            let doc_freq = field_index.doc_freqs.get(term).copied().unwrap_or(0);
            vector.terms.insert(
                term.clone(),
                TermStatistics {
                    term_freq,
                    doc_freq,
                },
            );
        }
        vector
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

/// Named [`MemoryIndex`] collections served as one backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    indexes: AHashMap<String, MemoryIndex>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index<S: Into<String>>(mut self, name: S, index: MemoryIndex) -> Self {
        self.indexes.insert(name.into(), index);
        self
    }

    pub fn index(&self, name: &str) -> Result<&MemoryIndex> {
        self.indexes
            .get(name)
            .ok_or_else(|| RocchioError::backend_unavailable(format!("no such index '{name}'")))
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(&self, index: &str, query: &str, limit: usize) -> Result<Vec<String>> {
        self.index(index)?.search_ids(query, limit)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl TermVectorSource for MemoryBackend {
    async fn term_vector(&self, index: &str, id: &str, field: &str) -> Result<TermVector> {
        Ok(self.index(index)?.document_term_vector(id, field))
    }
}
