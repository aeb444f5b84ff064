// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image embedding response types

use serde::{Deserialize, Serialize};

/// Response body for POST /vectorize-image
///
/// # Example
/// ```json
/// {"success": true, "vector": [0.01, -0.03, ...], "dimensions": 512}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeImageResponse {
    pub success: bool,

    /// Unit-norm CLIP image embedding
    pub vector: Vec<f32>,

    /// Vector length; fixed per model (512 for clip-vit-base-patch32)
    pub dimensions: usize,
}

impl VectorizeImageResponse {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            success: true,
            dimensions: vector.len(),
            vector,
        }
    }
}

/// Response body for POST /image-embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEmbedResponse {
    /// Unit-norm CLIP image embedding
    pub embedding: Vec<f32>,
}
