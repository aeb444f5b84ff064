// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for GET /, POST /embed and POST /text-embedding

use super::support::{l2_norm, post_json, vector_from, TestHarness, MOCK_DIM};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use serde_json::json;
use std::sync::atomic::Ordering;
use tower::ServiceExt;

#[tokio::test]
async fn test_root_liveness() {
    let harness = TestHarness::new();

    let response = harness
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("running"));

    // Liveness never touches the models
    assert_eq!(harness.text_inits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.image_inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embed_returns_unit_norm_vector() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/embed",
        json!({"text": "a gold ring"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let embedding = vector_from(&body, "embedding");
    assert_eq!(embedding.len(), MOCK_DIM);
    assert!((l2_norm(&embedding) - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_embed_missing_text_is_rejected_before_model() {
    let harness = TestHarness::new();

    let (status, body) = post_json(&harness.router, "/embed", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text must be a string");
    assert!(body.get("embedding").is_none());

    // Fail fast: no initialization, no inference
    assert_eq!(harness.text_inits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.text_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_embed_non_string_text_is_rejected() {
    let harness = TestHarness::new();

    for bad in [json!({"text": 42}), json!({"text": null}), json!({"text": [1, 2]})] {
        let (status, body) = post_json(&harness.router, "/embed", bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Text must be a string");
    }
    assert_eq!(harness.text_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_text_embedding_route_validates_too() {
    let harness = TestHarness::new();

    let (status, body) = post_json(&harness.router, "/text-embedding", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text must be a string");
}

#[tokio::test]
async fn test_both_text_routes_agree() {
    let harness = TestHarness::new();

    let (_, a) = post_json(&harness.router, "/embed", json!({"text": "matching"})).await;
    let (_, b) = post_json(
        &harness.router,
        "/text-embedding",
        json!({"text": "matching"}),
    )
    .await;

    assert_eq!(vector_from(&a, "embedding"), vector_from(&b, "embedding"));
}

#[tokio::test]
async fn test_concurrent_first_requests_initialize_once() {
    let harness = TestHarness::new();

    let requests = (0..8).map(|i| {
        let router = harness.router.clone();
        tokio::spawn(async move {
            post_json(&router, "/embed", json!({"text": format!("text {}", i)})).await
        })
    });

    for result in join_all(requests).await {
        let (status, body) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vector_from(&body, "embedding").len(), MOCK_DIM);
    }

    assert_eq!(harness.text_inits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.text_calls.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn test_failed_initialization_recovers_on_next_request() {
    let harness = TestHarness::with_flaky_text_loader();

    let (status, body) = post_json(&harness.router, "/embed", json!({"text": "first"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("not available"));

    let (status, body) = post_json(&harness.router, "/embed", json!({"text": "second"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vector_from(&body, "embedding").len(), MOCK_DIM);

    assert_eq!(harness.text_inits.load(Ordering::SeqCst), 2);
}
