//! REST host tests. Handlers are invoked in-process with constructed
//! extractors.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use rocchio::backend::{MemoryBackend, MemoryIndex};
use rocchio::expansion::RocchioConfig;
use rocchio::server::{AppState, ExpandQuery, expand_api};

fn state(defaults: RocchioConfig) -> Arc<AppState> {
    let mut index = MemoryIndex::default();
    index
        .add_document("1", [("body", "the cat sat on the mat")])
        .unwrap();
    index
        .add_document("2", [("body", "a dog chased the cat")])
        .unwrap();
    index
        .add_document("3", [("body", "dogs and more dogs")])
        .unwrap();

    let backend = Arc::new(MemoryBackend::new().with_index("pets", index));
    Arc::new(AppState::new(backend.clone(), backend, defaults))
}

fn params(query: &str) -> ExpandQuery {
    ExpandQuery {
        query: query.to_string(),
        ..Default::default()
    }
}

async fn call(state: Arc<AppState>, index: &str, params: ExpandQuery) -> (StatusCode, Value) {
    let response: Response = expand_api(State(state), Path(index.to_string()), Query(params))
        .await
        .into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_expand_returns_boosted_query_and_terms() {
    let query = ExpandQuery {
        field: Some("body".to_string()),
        fb_terms: Some(3),
        ..params("cat")
    };
    let (status, body) = call(state(RocchioConfig::default()), "pets", query).await;

    assert_eq!(status, StatusCode::OK);
    let terms = body["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 3);
    assert_eq!(body["feedbackDocs"], 2);

    let boosted = body["query"].as_str().unwrap();
    let boosted_terms: Vec<&str> = boosted
        .split_whitespace()
        .filter_map(|pair| pair.split_once('^').map(|(term, _)| term))
        .collect();
    let term_names: Vec<&str> = terms.iter().map(|t| t["term"].as_str().unwrap()).collect();
    assert_eq!(boosted_terms, term_names);
    assert!(body["query"].as_str().unwrap().ends_with(' '));
}

#[tokio::test]
async fn test_invalid_parameters_are_bad_request() {
    let query = ExpandQuery {
        fb_terms: Some(0),
        ..params("cat")
    };
    let (status, body) = call(state(RocchioConfig::default()), "pets", query).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fbTerms"));
}

#[tokio::test]
async fn test_unknown_index_is_bad_gateway() {
    let (status, body) = call(state(RocchioConfig::default()), "nowhere", params("cat")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("nowhere"));
}

#[tokio::test]
async fn test_no_match_in_strict_mode_is_not_found() {
    let defaults = RocchioConfig::default().with_require_feedback(true);
    let (status, _) = call(state(defaults), "pets", params("giraffe")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_match_falls_back_to_query() {
    let (status, body) = call(state(RocchioConfig::default()), "pets", params("giraffe")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedbackDocs"], 0);
    assert_eq!(body["terms"][0]["term"], "giraffe");
    assert_eq!(body["terms"][0]["weight"], 0.0);
}

#[tokio::test]
async fn test_terms_are_ranked_when_nothing_is_clipped() {
    let query = ExpandQuery {
        field: Some("body".to_string()),
        fb_terms: Some(100),
        ..params("cat")
    };
    let (status, body) = call(state(RocchioConfig::default()), "pets", query).await;

    assert_eq!(status, StatusCode::OK);
    let terms = body["terms"].as_array().unwrap();
    assert!(terms.len() > 1 && terms.len() < 100);
    let weights: Vec<f64> = terms.iter().map(|t| t["weight"].as_f64().unwrap()).collect();
    assert!(weights.windows(2).all(|p| p[0] >= p[1]));

    let boosted_terms: Vec<&str> = body["query"]
        .as_str()
        .unwrap()
        .split_whitespace()
        .filter_map(|pair| pair.split_once('^').map(|(term, _)| term))
        .collect();
    let term_names: Vec<&str> = terms.iter().map(|t| t["term"].as_str().unwrap()).collect();
    assert_eq!(boosted_terms, term_names);
}
