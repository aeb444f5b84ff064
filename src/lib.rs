// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod media;
pub mod similarity;

// Re-export main types
pub use api::{ApiError, ErrorResponse};
pub use config::ServiceConfig;
pub use embeddings::{BackendLoader, EmbeddingBackend, Modality, ModelRegistry, RegistryError};
pub use similarity::{cosine_similarity, SimilarityError};
