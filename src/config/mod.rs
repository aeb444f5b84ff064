// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Environment-derived service configuration
//!
//! The service is configured entirely through environment variables; there
//! is no config file and no authentication. Defaults match the reference
//! deployment: port 3000, CLIP ONNX exports under
//! `./models/clip-vit-base-patch32-onnx/`.

use std::env;
use std::path::PathBuf;

/// Default HTTP port
const DEFAULT_PORT: u16 = 3000;

/// Default per-request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const DEFAULT_MODEL_DIR: &str = "./models/clip-vit-base-patch32-onnx";

/// Runtime configuration resolved at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port (PORT)
    pub port: u16,

    /// Per-request timeout in seconds (REQUEST_TIMEOUT_SECS)
    pub request_timeout_secs: u64,

    /// CLIP text tower ONNX file (CLIP_TEXT_MODEL_PATH)
    pub text_model_path: PathBuf,

    /// CLIP tokenizer JSON file (CLIP_TOKENIZER_PATH)
    pub tokenizer_path: PathBuf,

    /// CLIP vision tower ONNX file (CLIP_VISION_MODEL_PATH)
    pub vision_model_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            text_model_path: PathBuf::from(format!("{}/text_model.onnx", DEFAULT_MODEL_DIR)),
            tokenizer_path: PathBuf::from(format!("{}/tokenizer.json", DEFAULT_MODEL_DIR)),
            vision_model_path: PathBuf::from(format!("{}/vision_model.onnx", DEFAULT_MODEL_DIR)),
        }
    }
}

impl ServiceConfig {
    /// Reads configuration from the process environment
    ///
    /// Unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_or(env::var("PORT").ok(), defaults.port),
            request_timeout_secs: parse_or(
                env::var("REQUEST_TIMEOUT_SECS").ok(),
                defaults.request_timeout_secs,
            ),
            text_model_path: env::var("CLIP_TEXT_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.text_model_path),
            tokenizer_path: env::var("CLIP_TOKENIZER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tokenizer_path),
            vision_model_path: env::var("CLIP_VISION_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.vision_model_path),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
