// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize-image and POST /image-embedding HTTP handlers

use crate::api::embed_image::{ImageEmbedRequest, ImageEmbedResponse, VectorizeImageResponse};
use crate::api::{ApiError, AppState};
use crate::embeddings::Modality;
use crate::media;
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::error;

/// Multipart upload handler: field `image` carries the file bytes
///
/// The upload is converted to a data-URI (`data:<mime>;base64,<payload>`)
/// before inference; the MIME type comes from the part's Content-Type
/// header, or magic-byte sniffing when the header is absent.
pub async fn vectorize_image_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VectorizeImageResponse>, ApiError> {
    let mut upload: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::ValidationError {
            field: "image".to_string(),
            message: format!("Invalid multipart body: {}", e),
        }
    })? {
        if field.name() == Some("image") {
            let mime = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| ApiError::ValidationError {
                field: "image".to_string(),
                message: format!("Failed to read image upload: {}", e),
            })?;
            upload = Some((bytes.to_vec(), mime));
            break;
        }
    }

    let (bytes, mime) = upload.ok_or_else(no_image_file)?;
    if bytes.is_empty() {
        return Err(no_image_file());
    }

    let mime = match mime.filter(|m| !m.is_empty()) {
        Some(m) => m,
        None => media::detect_mime(&bytes)
            .map_err(|e| ApiError::ValidationError {
                field: "image".to_string(),
                message: e.to_string(),
            })?
            .to_string(),
    };
    let data_uri = media::to_data_uri(&bytes, &mime);

    let model = acquire_image_model(&state).await?;
    let vector = model.embed(&data_uri).await.map_err(|e| {
        error!("Error during vectorization: {:#}", e);
        ApiError::InternalError("Failed to vectorize image".to_string())
    })?;

    Ok(Json(VectorizeImageResponse::new(vector)))
}

/// JSON handler: `imageBase64` carries a raw base64 payload or a data-URI
pub async fn image_embedding_handler(
    State(state): State<AppState>,
    Json(request): Json<ImageEmbedRequest>,
) -> Result<Json<ImageEmbedResponse>, ApiError> {
    let payload = request.validate()?;

    let data_uri =
        media::normalize_image_payload(payload).map_err(|e| ApiError::ValidationError {
            field: "imageBase64".to_string(),
            message: e.to_string(),
        })?;

    let model = acquire_image_model(&state).await?;
    let embedding = model.embed(&data_uri).await.map_err(|e| {
        error!("Embedding error: {:#}", e);
        ApiError::InternalError("Failed to generate embedding".to_string())
    })?;

    Ok(Json(ImageEmbedResponse { embedding }))
}

fn no_image_file() -> ApiError {
    ApiError::ValidationError {
        field: "image".to_string(),
        message: "No image file provided".to_string(),
    }
}

async fn acquire_image_model(
    state: &AppState,
) -> Result<crate::embeddings::BackendHandle, ApiError> {
    state.registry.acquire(Modality::Image).await.map_err(|e| {
        error!("Image model initialization failed: {}", e);
        ApiError::ModelUnavailable("Embedding model is not available".to_string())
    })
}
