// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed_image;
pub mod embed_text;
pub mod errors;
pub mod http_server;
pub mod similarity;

pub use embed_image::{
    image_embedding_handler, vectorize_image_handler, ImageEmbedRequest, ImageEmbedResponse,
    VectorizeImageResponse,
};
pub use embed_text::{embed_text_handler, TextEmbedRequest, TextEmbedResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{build_router, start_server, AppState, MAX_BODY_BYTES};
pub use similarity::{similarity_handler, SimilarityRequest, SimilarityResponse};
