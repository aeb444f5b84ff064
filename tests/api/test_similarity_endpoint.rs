// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for POST /similarity

use super::support::{post_json, TestHarness};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_self_similarity_is_one() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [0.6, 0.8], "b": [0.6, 0.8]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let score = body["similarity"].as_f64().unwrap();
    assert!((score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_similarity_is_symmetric() {
    let harness = TestHarness::new();

    let (_, ab) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [1.0, 2.0, 3.0], "b": [-1.0, 0.5, 2.0]}),
    )
    .await;
    let (_, ba) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [-1.0, 0.5, 2.0], "b": [1.0, 2.0, 3.0]}),
    )
    .await;

    assert_eq!(ab["similarity"], ba["similarity"]);
}

#[tokio::test]
async fn test_mismatched_lengths_are_rejected() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [1.0, 2.0, 3.0], "b": [1.0, 2.0]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("different lengths"));
}

#[tokio::test]
async fn test_zero_norm_vector_is_rejected() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [0.0, 0.0], "b": [1.0, 2.0]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("zero-norm"));
}

#[tokio::test]
async fn test_empty_vectors_are_rejected() {
    let harness = TestHarness::new();

    let (status, _) = post_json(
        &harness.router,
        "/similarity",
        json!({"a": [], "b": []}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_vector_is_rejected() {
    let harness = TestHarness::new();

    let (status, body) = post_json(&harness.router, "/similarity", json!({"a": [1.0]})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must be an array"));
}

#[tokio::test]
async fn test_similarity_never_touches_the_models() {
    let harness = TestHarness::new();

    post_json(
        &harness.router,
        "/similarity",
        json!({"a": [1.0, 0.0], "b": [0.0, 1.0]}),
    )
    .await;

    assert_eq!(harness.text_inits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.image_inits.load(Ordering::SeqCst), 0);
}
