// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! TextEmbedResponse type

use serde::{Deserialize, Serialize};

/// Response body for POST /embed and POST /text-embedding
///
/// # Example
/// ```json
/// {"embedding": [0.01, -0.03, ...]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEmbedResponse {
    /// Unit-norm CLIP text embedding
    pub embedding: Vec<f32>,
}
