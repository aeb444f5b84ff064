// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ImageEmbedRequest type with boundary validation

use crate::api::ApiError;
use serde::Deserialize;

/// Request body for POST /image-embedding
///
/// `imageBase64` accepts either a raw base64 payload or a full data-URI
/// (`data:image/png;base64,...`).
///
/// # Example
/// ```json
/// {"imageBase64": "iVBORw0KGgo..."}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEmbedRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl ImageEmbedRequest {
    /// Validates the request and returns the raw payload
    ///
    /// Rejects a missing field and empty or whitespace-only payloads before
    /// any model interaction. Base64/data-URI structure is checked by the
    /// media layer.
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.image_base64.as_deref() {
            Some(payload) if !payload.trim().is_empty() => Ok(payload),
            _ => Err(ApiError::ValidationError {
                field: "imageBase64".to_string(),
                message: "imageBase64 is required".to_string(),
            }),
        }
    }
}
