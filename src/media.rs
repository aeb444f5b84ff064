// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inbound image payload handling
//!
//! The embedding backends consume images as data-URI strings
//! (`data:<mime>;base64,<payload>`). Clients may send the image three ways:
//! a multipart file upload (raw bytes + MIME type), a raw base64 payload, or
//! a data-URI already in final form. This module converts every accepted
//! encoding to the canonical data-URI, so equal bytes always reach the model
//! as the same string.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Maximum decoded image size (50MB, matching the JSON body limit)
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Custom error types for image payload processing
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Malformed data URI")]
    MalformedDataUri,

    #[error("Image data is empty")]
    EmptyData,
}

/// Converts raw image bytes and a MIME type into a data-URI string
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Detects the MIME type from magic bytes
///
/// Supports the formats the vision preprocessing can decode.
pub fn detect_mime(bytes: &[u8]) -> Result<&'static str, MediaError> {
    if bytes.len() < 4 {
        return Err(MediaError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok("image/png"),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok("image/jpeg"),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok("image/webp"),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok("image/gif"),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok("image/bmp"),

        _ => Err(MediaError::UnsupportedFormat),
    }
}

/// Normalizes a client-supplied image payload into a canonical data-URI
///
/// Accepts either a full data-URI (validated and passed through) or a raw
/// base64 payload (decoded to sniff the MIME type, then re-wrapped). Empty
/// and oversized payloads are rejected before any model interaction.
pub fn normalize_image_payload(payload: &str) -> Result<String, MediaError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(MediaError::EmptyData);
    }

    if payload.starts_with("data:") {
        // Validate structure and payload without re-encoding
        let (bytes, mime) = decode_data_uri(payload)?;
        return Ok(to_data_uri(&bytes, &mime));
    }

    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(MediaError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }

    let mime = detect_mime(&bytes)?;
    Ok(to_data_uri(&bytes, mime))
}

/// Decodes a data-URI into raw bytes and its declared MIME type
pub fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, String), MediaError> {
    let rest = uri.strip_prefix("data:").ok_or(MediaError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::MalformedDataUri)?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::MalformedDataUri)?;
    if mime.is_empty() {
        return Err(MediaError::MalformedDataUri);
    }

    if payload.is_empty() {
        return Err(MediaError::EmptyData);
    }

    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(MediaError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }

    Ok((bytes, mime.to_string()))
}
