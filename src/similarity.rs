// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Cosine similarity between embedding vectors
//!
//! Embeddings produced by this service are already L2-normalized, so their
//! dot product equals the cosine. The helper still divides by both norms so
//! it is correct for arbitrary client-supplied vectors, and it rejects the
//! degenerate inputs (mismatched lengths, empty vectors, zero norms) with
//! typed errors instead of producing NaN.

use thiserror::Error;

/// Errors for undefined cosine similarity inputs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    #[error("vectors have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("vectors must not be empty")]
    Empty,

    #[error("cosine similarity is undefined for zero-norm vectors")]
    ZeroNorm,
}

/// Computes the cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Returns a value in `[-1, 1]` for valid inputs. Inputs with mismatched
/// lengths, zero length, or zero norm are rejected.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::LengthMismatch(a.len(), b.len()));
    }
    if a.is_empty() {
        return Err(SimilarityError::Empty);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Err(SimilarityError::ZeroNorm);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
