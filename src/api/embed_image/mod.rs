// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image embedding endpoints
//!
//! Serves POST /vectorize-image (multipart file upload) and
//! POST /image-embedding (JSON, raw base64 or data-URI). Every accepted
//! encoding is converted to the same canonical data-URI before inference,
//! so equal bytes produce equal vectors.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{image_embedding_handler, vectorize_image_handler};
pub use request::ImageEmbedRequest;
pub use response::{ImageEmbedResponse, VectorizeImageResponse};
