//! Elasticsearch HTTP backend.
//!
//! Uses two REST endpoints:
//!
//! | Role | Endpoint |
//! |------|----------|
//! | search | `POST /{index}/_search` with a `query_string` query |
//! | term vectors | `POST /{index}/_mtermvectors` with term and field statistics |
//!
//! All transport failures, non-success statuses and undecodable bodies are
//! reported as [`RocchioError::BackendUnavailable`].

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{FieldStatistics, TermStatistics, TermVector};
use super::{SearchBackend, TermVectorSource};
use crate::error::{Result, RocchioError};

/// Connection settings for [`ElasticsearchBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// Basic credentials as `user:password`.
    pub auth: Option<String>,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Option<Duration>,
}

impl ElasticsearchConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        ElasticsearchConfig {
            url: url.into(),
            auth: None,
            timeout: None,
        }
    }

    pub fn with_auth<S: Into<String>>(mut self, auth: S) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Search and term-vector collaborator backed by an Elasticsearch cluster.
pub struct ElasticsearchBackend {
    client: Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl std::fmt::Debug for ElasticsearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchBackend")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.credentials.is_some())
            .finish()
    }
}

impl ElasticsearchBackend {
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RocchioError::invalid_config(
                "Elasticsearch URL must not be empty",
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            RocchioError::invalid_config(format!("failed to build HTTP client: {e}"))
        })?;

        let credentials = config.auth.map(|auth| match auth.split_once(':') {
            Some((user, password)) => (user.to_string(), Some(password.to_string())),
            None => (auth, None),
        });

        Ok(ElasticsearchBackend {
            client,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, index: &str, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, index, action)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }

    async fn post<T: DeserializeOwned>(&self, url: String, body: serde_json::Value) -> Result<T> {
        debug!("POST {url}");
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RocchioError::backend_unavailable(format!(
                "{url} returned {status}: {detail}"
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn search(&self, index: &str, query: &str, limit: usize) -> Result<Vec<String>> {
        let body = json!({
            "query": { "query_string": { "query": query } },
            "size": limit,
            "_source": false,
        });
        let response: SearchResponse = self.post(self.endpoint(index, "_search"), body).await?;
        Ok(response.into_ids())
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

#[async_trait]
impl TermVectorSource for ElasticsearchBackend {
    async fn term_vector(&self, index: &str, id: &str, field: &str) -> Result<TermVector> {
        let ids = [id.to_string()];
        let mut vectors = self.term_vectors(index, &ids, field).await?;
        Ok(vectors.pop().unwrap_or_else(|| TermVector::empty(id)))
    }

    /// One `_mtermvectors` round trip for all ids.
    async fn term_vectors(
        &self,
        index: &str,
        ids: &[String],
        field: &str,
    ) -> Result<Vec<TermVector>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({
            "ids": ids,
            "parameters": {
                "fields": [field],
                "term_statistics": true,
                "field_statistics": true,
                "offsets": false,
                "positions": false,
                "payloads": false,
            },
        });
        let response: MultiTermVectorsResponse =
            self.post(self.endpoint(index, "_mtermvectors"), body).await?;
        Ok(response.into_term_vectors(ids, field))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
}

impl SearchResponse {
    fn into_ids(self) -> Vec<String> {
        self.hits.hits.into_iter().map(|hit| hit.id).collect()
    }
}

#[derive(Debug, Deserialize)]
struct MultiTermVectorsResponse {
    #[serde(default)]
    docs: Vec<TermVectorsDoc>,
}

#[derive(Debug, Deserialize)]
struct TermVectorsDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(default)]
    term_vectors: IndexMap<String, FieldTermVector>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FieldTermVector {
    #[serde(default)]
    field_statistics: Option<EsFieldStatistics>,
    #[serde(default)]
    terms: IndexMap<String, EsTermStatistics>,
}

#[derive(Debug, Deserialize)]
struct EsFieldStatistics {
    doc_count: i64,
    sum_ttf: i64,
}

#[derive(Debug, Deserialize)]
struct EsTermStatistics {
    #[serde(default)]
    term_freq: u64,
    #[serde(default)]
    doc_freq: u64,
}

impl MultiTermVectorsResponse {
    /// Convert to term vectors in the order of `ids`; documents that are
    /// missing, failed, or lack `field` become empty vectors.
    fn into_term_vectors(self, ids: &[String], field: &str) -> Vec<TermVector> {
        let mut by_id: IndexMap<String, TermVectorsDoc> = IndexMap::new();
        for doc in self.docs {
            by_id.entry(doc.id.clone()).or_insert(doc);
        }

        ids.iter()
            .map(|id| match by_id.swap_remove(id) {
                Some(doc) => doc.into_term_vector(field),
                None => {
                    warn!("no term vector returned for document '{id}'");
                    TermVector::empty(id.as_str())
                }
            })
            .collect()
    }
}

impl TermVectorsDoc {
    fn into_term_vector(mut self, field: &str) -> TermVector {
        if let Some(error) = &self.error {
            warn!("term vector request for '{}' failed: {error}", self.id);
            return TermVector::empty(self.id);
        }
        if !self.found {
            return TermVector::empty(self.id);
        }
        let Some(field_vector) = self.term_vectors.swap_remove(field) else {
            return TermVector::empty(self.id);
        };

        let field_statistics = field_vector
            .field_statistics
            .filter(|stats| stats.doc_count >= 0 && stats.sum_ttf >= 0)
            .map(|stats| FieldStatistics::new(stats.doc_count as u64, stats.sum_ttf as u64));

        TermVector {
            id: self.id,
            terms: field_vector
                .terms
                .into_iter()
                .map(|(term, stats)| {
                    (
                        term,
                        TermStatistics {
                            term_freq: stats.term_freq,
                            doc_freq: stats.doc_freq,
                        },
                    )
                })
                .collect(),
            field_statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MTERMVECTORS_RESPONSE: &str = r#"{
      "docs": [
        {
          "_index": "biocaddie", "_id": "d2", "_version": 1, "found": true, "took": 1,
          "term_vectors": {
            "text": {
              "field_statistics": { "sum_doc_freq": 40, "doc_count": 4, "sum_ttf": 60 },
              "terms": {
                "brain": { "doc_freq": 2, "ttf": 5, "term_freq": 3 },
                "lesion": { "doc_freq": 1, "ttf": 1, "term_freq": 1 }
              }
            }
          }
        },
        { "_index": "biocaddie", "_id": "d1", "_version": 1, "found": true, "took": 1,
          "term_vectors": {} },
        { "_index": "biocaddie", "_id": "d3", "found": false }
      ]
    }"#;

    #[test]
    fn test_decode_search_hits() {
        let body = r#"{
          "took": 3, "timed_out": false,
          "hits": { "total": { "value": 2, "relation": "eq" }, "max_score": 1.3,
            "hits": [
              { "_index": "biocaddie", "_id": "b", "_score": 1.3 },
              { "_index": "biocaddie", "_id": "a", "_score": 0.7 }
            ] }
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_decode_empty_search() {
        let body = r#"{ "hits": { "total": 0, "hits": [] } }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_ids().is_empty());
    }

    #[test]
    fn test_decode_term_vectors_in_request_order() {
        let response: MultiTermVectorsResponse =
            serde_json::from_str(MTERMVECTORS_RESPONSE).unwrap();
        let ids: Vec<String> = ["d1", "d2", "d3", "d4"].iter().map(|s| s.to_string()).collect();

        let vectors = response.into_term_vectors(&ids, "text");
        let order: Vec<&str> = vectors.iter().map(|tv| tv.id.as_str()).collect();
        assert_eq!(order, vec!["d1", "d2", "d3", "d4"]);

        // d1 has no "text" field, d3 was not found, d4 was not returned at all.
        assert_eq!(vectors[0], TermVector::empty("d1"));
        assert_eq!(vectors[2], TermVector::empty("d3"));
        assert_eq!(vectors[3], TermVector::empty("d4"));

        let d2 = &vectors[1];
        assert_eq!(d2.field_statistics, Some(FieldStatistics::new(4, 60)));
        let terms: Vec<&str> = d2.terms.keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["brain", "lesion"]);
        assert_eq!(
            d2.terms["brain"],
            TermStatistics {
                term_freq: 3,
                doc_freq: 2
            }
        );
    }

    #[test]
    fn test_negative_field_statistics_are_dropped() {
        let body = r#"{ "docs": [ { "_id": "x", "found": true, "term_vectors": {
            "text": { "field_statistics": { "doc_count": -1, "sum_ttf": -1 },
                      "terms": { "a": { "term_freq": 1, "doc_freq": 1 } } } } } ] }"#;
        let response: MultiTermVectorsResponse = serde_json::from_str(body).unwrap();
        let vectors = response.into_term_vectors(&["x".to_string()], "text");
        assert_eq!(vectors[0].field_statistics, None);
        assert_eq!(vectors[0].terms.len(), 1);
    }

    #[test]
    fn test_failed_document_becomes_empty() {
        let body = r#"{ "docs": [ { "_id": "x", "error": { "type": "index_not_found_exception" } } ] }"#;
        let response: MultiTermVectorsResponse = serde_json::from_str(body).unwrap();
        let vectors = response.into_term_vectors(&["x".to_string()], "text");
        assert_eq!(vectors[0], TermVector::empty("x"));
    }

    #[test]
    fn test_backend_configuration() {
        let backend = ElasticsearchBackend::new(
            ElasticsearchConfig::new("http://localhost:9200/")
                .with_auth("elastic:secret")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        assert_eq!(
            backend.endpoint("biocaddie", "_search"),
            "http://localhost:9200/biocaddie/_search"
        );
        assert_eq!(
            backend.credentials,
            Some(("elastic".to_string(), Some("secret".to_string())))
        );
        assert_eq!(backend.name(), "elasticsearch");

        assert!(ElasticsearchBackend::new(ElasticsearchConfig::new("")).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_backend_unavailable() {
        let backend = ElasticsearchBackend::new(
            ElasticsearchConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        match backend.search("idx", "query", 10).await {
            Err(RocchioError::BackendUnavailable(_)) => {}
            other => panic!("Expected BackendUnavailable, got {other:?}"),
        }
    }
}
