// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding backends and the lazy model registry
//!
//! A backend is an opaque `embed(input) -> vector` capability. Text backends
//! take a UTF-8 string; image backends take a data-URI string. Both apply
//! the same post-processing (mean pooling, then L2 normalization), so every
//! vector leaving this module has unit norm and identical dimensionality
//! per backend instance.

pub mod clip_model;
pub mod registry;

pub use clip_model::{clip_image_loader, clip_text_loader, ClipImageModel, ClipTextModel};
pub use registry::{BackendLoader, ModelRegistry, RegistryError};

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Input modality served by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Image => write!(f, "image"),
        }
    }
}

/// An initialized embedding model capability
///
/// Implementations must be safe for concurrent invocation once constructed;
/// the ONNX-backed models serialize on an internal session lock.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embeds one input (text, or an image as a data-URI) into a
    /// fixed-length unit-norm vector.
    async fn embed(&self, input: &str) -> Result<Vec<f32>>;

    /// Output dimensionality; identical for every vector this backend returns.
    fn dimension(&self) -> usize;

    /// Backend name for logs
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingBackend")
            .field("name", &self.name())
            .finish()
    }
}

/// Shared handle to a backend
pub type BackendHandle = Arc<dyn EmbeddingBackend>;

/// Mean pooling over token/patch positions, weighted by an attention mask
///
/// `hidden` is row-major `[seq_len, hidden_dim]`; positions with mask 0
/// (padding) do not contribute. Returns a `hidden_dim` vector.
pub(crate) fn masked_mean_pool(hidden: &[f32], hidden_dim: usize, mask: &[i64]) -> Vec<f32> {
    let seq_len = mask.len();
    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = mask[i] as f32;
        sum_mask += mask_value;
        let row = &hidden[i * hidden_dim..(i + 1) * hidden_dim];
        for (acc, value) in pooled.iter_mut().zip(row) {
            *acc += value * mask_value;
        }
    }

    // Avoid division by zero on an all-padding mask
    for val in &mut pooled {
        *val /= sum_mask.max(1e-9);
    }

    pooled
}

/// Scales a vector in place to unit L2 norm; zero vectors are left unchanged
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in v.iter_mut() {
            *value /= norm;
        }
    }
}
