// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text embedding endpoints
//!
//! Serves POST /embed and POST /text-embedding; both return a 512-dimensional
//! CLIP text embedding as `{"embedding": [...]}`.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embed_text_handler;
pub use request::TextEmbedRequest;
pub use response::TextEmbedResponse;
