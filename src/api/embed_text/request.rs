// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! TextEmbedRequest type with boundary validation

use crate::api::ApiError;
use serde::Deserialize;

/// Request body for POST /embed and POST /text-embedding
///
/// `text` is kept as a raw JSON value so that a missing field, a non-string
/// value, and an empty string are all rejected with the service's own
/// validation error instead of a deserialization failure.
///
/// # Example
/// ```json
/// {"text": "a gold ring"}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TextEmbedRequest {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

impl TextEmbedRequest {
    /// Validates the request and returns the text to embed
    ///
    /// Rejects a missing `text` field, a non-string value, and empty or
    /// whitespace-only strings. Runs before any model interaction.
    pub fn validate(&self) -> Result<&str, ApiError> {
        match &self.text {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s),
            _ => Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: "Text must be a string".to_string(),
            }),
        }
    }
}
