// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /similarity HTTP handler

use crate::api::similarity::{SimilarityRequest, SimilarityResponse};
use crate::api::ApiError;
use crate::similarity::cosine_similarity;
use axum::Json;

/// Scores the cosine similarity of two vectors
///
/// Purely computational; never touches the model registry. Mismatched
/// lengths, empty vectors, and zero-norm vectors are client errors.
pub async fn similarity_handler(
    Json(request): Json<SimilarityRequest>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let (a, b) = request.validate()?;

    let similarity = cosine_similarity(a, b).map_err(|e| ApiError::ValidationError {
        field: "vectors".to_string(),
        message: e.to_string(),
    })?;

    Ok(Json(SimilarityResponse { similarity }))
}
