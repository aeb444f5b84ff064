// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! SimilarityResponse type

use serde::{Deserialize, Serialize};

/// Response body for POST /similarity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}
