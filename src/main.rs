// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clip_embed_node::{
    api::start_server,
    config::ServiceConfig,
    embeddings::{clip_image_loader, clip_text_loader, ModelRegistry},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    tracing::info!("🧠 Starting CLIP embedding node (port {})", config.port);
    tracing::info!(
        "   text model:   {}",
        config.text_model_path.display()
    );
    tracing::info!(
        "   vision model: {}",
        config.vision_model_path.display()
    );

    // Models load lazily on first use; the registry coalesces concurrent
    // first requests onto a single load per modality.
    let registry = Arc::new(ModelRegistry::new(
        clip_text_loader(
            config.text_model_path.clone(),
            config.tokenizer_path.clone(),
        ),
        clip_image_loader(config.vision_model_path.clone()),
    ));

    start_server(&config, registry)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
