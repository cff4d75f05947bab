//! Collaborators consumed by the expansion core.
//!
//! The core talks to two services:
//!
//! - a [`SearchBackend`] that runs the initial query and returns ranked
//!   document ids, and
//! - a [`TermVectorSource`] that returns per-document term frequencies
//!   together with corpus statistics.
//!
//! Both are async traits so network backends can be plugged in. Two
//! implementations ship with the crate: [`MemoryBackend`] (in-process,
//! built from documents) and [`ElasticsearchBackend`] (HTTP).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::{Result, RocchioError};

pub mod elasticsearch;
pub mod memory;
pub mod types;

pub use elasticsearch::{ElasticsearchBackend, ElasticsearchConfig};
pub use memory::{ALL_FIELD, MemoryBackend, MemoryIndex};
pub use types::{FieldStatistics, TermStatistics, TermVector};

/// Runs a query and returns ranked document ids.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute `query` against `index`, returning at most `limit` ids in
    /// rank order.
    async fn search(&self, index: &str, query: &str, limit: usize) -> Result<Vec<String>>;

    /// Get the name of this backend for logging.
    fn name(&self) -> &str;
}

/// Returns term vectors with corpus statistics.
#[async_trait]
pub trait TermVectorSource: Send + Sync {
    /// Term vector of `field` in document `id`.
    ///
    /// Documents without the field yield an empty vector rather than an
    /// error.
    async fn term_vector(&self, index: &str, id: &str, field: &str) -> Result<TermVector>;

    /// Term vectors for several documents, returned in the order of `ids`.
    ///
    /// The default implementation issues the single-document requests
    /// concurrently.
    async fn term_vectors(
        &self,
        index: &str,
        ids: &[String],
        field: &str,
    ) -> Result<Vec<TermVector>> {
        try_join_all(ids.iter().map(|id| self.term_vector(index, id, field))).await
    }
}

/// Await `future`, failing with a backend timeout after `timeout`.
pub async fn with_timeout<T, F>(timeout: Option<Duration>, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        None => future.await,
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
            RocchioError::timeout(format!("{operation} after {}ms", limit.as_millis()))
        })?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let value = with_timeout(Some(Duration::from_secs(5)), "noop", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let value = with_timeout(None, "noop", async { Ok("done") }).await.unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: Result<()> = with_timeout(Some(Duration::from_millis(10)), "search", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(RocchioError::BackendUnavailable(msg)) => assert!(msg.contains("search")),
            other => panic!("Expected BackendUnavailable, got {other:?}"),
        }
    }
}
