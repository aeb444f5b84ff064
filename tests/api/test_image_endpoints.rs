// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for POST /vectorize-image and POST /image-embedding

use super::support::{
    l2_norm, post_json, post_multipart, vector_from, TestHarness, MOCK_DIM, TINY_PNG_BASE64,
};
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_vectorize_image_multipart_upload() {
    let harness = TestHarness::new();
    let png_bytes = STANDARD.decode(TINY_PNG_BASE64).unwrap();

    let (status, body) = post_multipart(
        &harness.router,
        "/vectorize-image",
        "image",
        "image/png",
        &png_bytes,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dimensions"], MOCK_DIM);

    let vector = vector_from(&body, "vector");
    assert_eq!(vector.len(), MOCK_DIM);
    assert!((l2_norm(&vector) - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_vectorize_image_without_file_is_400() {
    let harness = TestHarness::new();

    // Multipart body present but no "image" field
    let (status, body) = post_multipart(
        &harness.router,
        "/vectorize-image",
        "attachment",
        "image/png",
        b"irrelevant",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
    assert!(body.get("vector").is_none());

    // No model interaction on validation failure
    assert_eq!(harness.image_inits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.image_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_vectorize_image_empty_file_is_400() {
    let harness = TestHarness::new();

    let (status, body) =
        post_multipart(&harness.router, "/vectorize-image", "image", "image/png", b"").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_image_embedding_raw_base64() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/image-embedding",
        json!({"imageBase64": TINY_PNG_BASE64}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let embedding = vector_from(&body, "embedding");
    assert_eq!(embedding.len(), MOCK_DIM);
}

#[tokio::test]
async fn test_image_embedding_missing_payload() {
    let harness = TestHarness::new();

    let (status, body) = post_json(&harness.router, "/image-embedding", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "imageBase64 is required");
    assert_eq!(harness.image_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_image_embedding_invalid_base64() {
    let harness = TestHarness::new();

    let (status, body) = post_json(
        &harness.router,
        "/image-embedding",
        json!({"imageBase64": "not-valid-base64!!!"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("base64"));
    assert_eq!(harness.image_calls.load(Ordering::SeqCst), 0);
}

/// The three accepted encodings of the same bytes must reach the model as
/// the same data-URI and therefore produce identical vectors.
#[tokio::test]
async fn test_all_image_encodings_produce_equal_vectors() {
    let harness = TestHarness::new();
    let png_bytes = STANDARD.decode(TINY_PNG_BASE64).unwrap();

    let (_, multipart_body) = post_multipart(
        &harness.router,
        "/vectorize-image",
        "image",
        "image/png",
        &png_bytes,
    )
    .await;
    let from_multipart = vector_from(&multipart_body, "vector");

    let (_, raw_body) = post_json(
        &harness.router,
        "/image-embedding",
        json!({"imageBase64": TINY_PNG_BASE64}),
    )
    .await;
    let from_raw = vector_from(&raw_body, "embedding");

    let (_, uri_body) = post_json(
        &harness.router,
        "/image-embedding",
        json!({"imageBase64": format!("data:image/png;base64,{}", TINY_PNG_BASE64)}),
    )
    .await;
    let from_uri = vector_from(&uri_body, "embedding");

    assert_eq!(from_multipart, from_raw);
    assert_eq!(from_raw, from_uri);
}

#[tokio::test]
async fn test_image_model_initializes_once_across_routes() {
    let harness = TestHarness::new();
    let png_bytes = STANDARD.decode(TINY_PNG_BASE64).unwrap();

    post_multipart(
        &harness.router,
        "/vectorize-image",
        "image",
        "image/png",
        &png_bytes,
    )
    .await;
    post_json(
        &harness.router,
        "/image-embedding",
        json!({"imageBase64": TINY_PNG_BASE64}),
    )
    .await;

    assert_eq!(harness.image_inits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.image_calls.load(Ordering::SeqCst), 2);
}
