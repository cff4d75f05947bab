//! REST host for query expansion.
//!
//! Exposes `GET /{index}/_expand?query=...` and answers with the expanded
//! query as a boosted query string plus the weighted terms.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::backend::{SearchBackend, TermVectorSource};
use crate::error::{Result, RocchioError};
use crate::expansion::{ExpandedTerm, RocchioConfig, RocchioExpander};

/// Shared collaborators and the parameter defaults applied to requests.
pub struct AppState {
    pub search: Arc<dyn SearchBackend>,
    pub term_vectors: Arc<dyn TermVectorSource>,
    pub defaults: RocchioConfig,
}

impl AppState {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        term_vectors: Arc<dyn TermVectorSource>,
        defaults: RocchioConfig,
    ) -> Self {
        AppState {
            search,
            term_vectors,
            defaults,
        }
    }
}

/// Query parameters of `/{index}/_expand`. Absent values fall back to the
/// server defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandQuery {
    pub query: String,
    pub field: Option<String>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub k1: Option<f64>,
    pub b: Option<f64>,
    pub fb_docs: Option<usize>,
    pub fb_terms: Option<usize>,
    pub stop_words: Option<bool>,
}

impl ExpandQuery {
    /// Overlay the request parameters on `defaults`.
    pub fn to_config(&self, defaults: &RocchioConfig) -> RocchioConfig {
        let mut config = defaults.clone();
        if let Some(field) = &self.field {
            config.field = field.clone();
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(k1) = self.k1 {
            config.k1 = k1;
        }
        if let Some(b) = self.b {
            config.b = b;
        }
        if let Some(fb_docs) = self.fb_docs {
            config.fb_docs = fb_docs;
        }
        if let Some(fb_terms) = self.fb_terms {
            config.fb_terms = fb_terms;
        }
        if let Some(stop_words) = self.stop_words {
            config.stop_words = stop_words;
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    /// `term^weight` pairs separated by spaces, heaviest first.
    pub query: String,
    /// Expansion terms by descending weight.
    pub terms: Vec<ExpandedTerm>,
    pub feedback_docs: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RocchioError {
    fn into_response(self) -> Response {
        let status = match &self {
            RocchioError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            RocchioError::NoResults(_) => StatusCode::NOT_FOUND,
            RocchioError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/{index}/_expand", get(expand_api))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn expand_api(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
    Query(params): Query<ExpandQuery>,
) -> std::result::Result<Json<ExpandResponse>, RocchioError> {
    let request_id = Uuid::new_v4();
    info!("[{request_id}] expand '{}' on '{index}'", params.query);

    let config = params.to_config(&state.defaults);
    let expander = RocchioExpander::new(
        state.search.clone(),
        state.term_vectors.clone(),
        config,
    )
    .inspect_err(|e| warn!("[{request_id}] rejected: {e}"))?;

    let expansion = expander
        .expand_detailed(&index, &params.query)
        .await
        .inspect_err(|e| warn!("[{request_id}] failed: {e}"))?;

    Ok(Json(ExpandResponse {
        query: expansion.vector.to_boosted_query(),
        terms: expansion.vector.ranked(),
        feedback_docs: expansion.feedback_documents.len(),
    }))
}
