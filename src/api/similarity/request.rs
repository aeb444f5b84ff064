// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! SimilarityRequest type with boundary validation

use crate::api::ApiError;
use serde::Deserialize;

/// Request body for POST /similarity
///
/// # Example
/// ```json
/// {"a": [0.1, 0.2], "b": [0.3, 0.4]}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub a: Option<Vec<f32>>,
    #[serde(default)]
    pub b: Option<Vec<f32>>,
}

impl SimilarityRequest {
    /// Validates presence of both vectors; numeric policy (lengths, norms)
    /// is enforced by the similarity utility itself.
    pub fn validate(&self) -> Result<(&[f32], &[f32]), ApiError> {
        let a = self.a.as_deref().ok_or_else(|| missing("a"))?;
        let b = self.b.as_deref().ok_or_else(|| missing("b"))?;
        Ok((a, b))
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::ValidationError {
        field: field.to_string(),
        message: format!("{} must be an array of numbers", field),
    }
}
