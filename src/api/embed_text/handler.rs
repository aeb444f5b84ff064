// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed and POST /text-embedding HTTP handler

use crate::api::embed_text::{TextEmbedRequest, TextEmbedResponse};
use crate::api::{ApiError, AppState};
use crate::embeddings::Modality;
use axum::{extract::State, Json};
use tracing::error;

/// Generates a CLIP text embedding
///
/// Validation happens before the model is touched, so malformed requests
/// never pay the model-initialization or inference cost.
pub async fn embed_text_handler(
    State(state): State<AppState>,
    Json(request): Json<TextEmbedRequest>,
) -> Result<Json<TextEmbedResponse>, ApiError> {
    let text = request.validate()?.to_string();

    let model = state
        .registry
        .acquire(Modality::Text)
        .await
        .map_err(|e| {
            error!("Text model initialization failed: {}", e);
            ApiError::ModelUnavailable("Embedding model is not available".to_string())
        })?;

    let embedding = model.embed(&text).await.map_err(|e| {
        error!("Embedding error: {:#}", e);
        ApiError::InternalError("Failed to generate embedding".to_string())
    })?;

    Ok(Json(TextEmbedResponse { embedding }))
}
