// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX CLIP backends (clip-vit-base-patch32)
//!
//! Wraps ONNX Runtime sessions for the CLIP text and vision towers. Both
//! towers project into the same 512-dimensional space; the text side uses a
//! HuggingFace tokenizer, the vision side decodes a data-URI into pixels and
//! applies CLIP channel normalization. Post-processing is identical for
//! both: mean pooling over token/patch positions, then L2 normalization, so
//! vectors are directly comparable via dot product.

use crate::embeddings::{l2_normalize, masked_mean_pool, BackendHandle, BackendLoader, EmbeddingBackend};
use crate::media;
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use ndarray::{Array2, Array4, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::info;

/// CLIP ViT-B/32 projection dimension
pub const CLIP_EMBED_DIM: usize = 512;

/// CLIP input resolution
const CLIP_IMAGE_SIZE: u32 = 224;

/// CLIP per-channel pixel normalization (RGB)
const CLIP_PIXEL_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const CLIP_PIXEL_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Builds an ONNX Runtime session on the CPU execution provider
fn build_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load ONNX model from {}",
            model_path.display()
        ))
}

/// CLIP text tower
///
/// # Thread Safety
/// The session is wrapped in `Arc<Mutex>` for thread-safe shared access;
/// inference calls serialize on it.
#[derive(Clone)]
pub struct ClipTextModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    dimension: usize,
}

impl std::fmt::Debug for ClipTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipTextModel")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl ClipTextModel {
    /// Loads the text tower and tokenizer from disk
    ///
    /// Runs one probe inference to confirm the model emits token-level
    /// hidden states with the expected 512-wide projection.
    pub async fn new<P: AsRef<Path>>(model_path: P, tokenizer_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let mut session = build_session(model_path)?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // Probe inference: validate the output is [batch, seq, 512]
        let encoding = tokenizer
            .encode("validation test", true)
            .map_err(|e| anyhow::anyhow!("Tokenizer validation failed: {}", e))?;

        let (_, shape) = run_text_inference(&mut session, &encoding)?;
        if shape.len() != 3 || shape[2] != CLIP_EMBED_DIM {
            anyhow::bail!(
                "Text model outputs unexpected dimensions: {:?} (expected [batch, seq, {}])",
                shape,
                CLIP_EMBED_DIM
            );
        }

        info!("✅ CLIP text model loaded from {}", model_path.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            dimension: CLIP_EMBED_DIM,
        })
    }
}

/// Tokenized inference against the text tower
///
/// Returns the flattened output tensor together with its shape, expected to
/// be token-level hidden states [batch, seq_len, hidden_dim].
fn run_text_inference(
    session: &mut Session,
    encoding: &tokenizers::Encoding,
) -> Result<(Vec<f32>, Vec<usize>)> {
    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();

    let seq_len = input_ids.len();
    let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
        .context("Failed to create attention_mask array")?;

    let outputs = session.run(ort::inputs![
        "input_ids" => Value::from_array(input_ids_array)?,
        "attention_mask" => Value::from_array(attention_mask_array)?
    ])?;

    // Use index [0] instead of name since different exports may name the
    // output differently
    let output_array = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    Ok((
        output_array.iter().copied().collect(),
        output_array.shape().to_vec(),
    ))
}

#[async_trait]
impl EmbeddingBackend for ClipTextModel {
    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(input, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        // Lock session for thread-safe access
        let (flat, shape) = {
            let mut session_guard = self.session.lock().unwrap();
            run_text_inference(&mut session_guard, &encoding)?
        };

        if shape.len() != 3 {
            anyhow::bail!("Text model output has unexpected rank: {:?}", shape);
        }

        // Token-level hidden states [batch, seq_len, hidden_dim] with a
        // single batch row: mean pool over the sequence, weighted by the
        // attention mask, then normalize.
        let mut embedding = masked_mean_pool(&flat, shape[2], &attention_mask);
        l2_normalize(&mut embedding);

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "clip-vit-base-patch32/text"
    }
}

/// CLIP vision tower
///
/// Consumes images as data-URI strings, the canonical form every accepted
/// upload encoding is converted to.
#[derive(Clone)]
pub struct ClipImageModel {
    session: Arc<Mutex<Session>>,
    dimension: usize,
}

impl std::fmt::Debug for ClipImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipImageModel")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl ClipImageModel {
    /// Loads the vision tower from disk
    ///
    /// Probes the session with a zero pixel tensor to confirm the projection
    /// width before accepting traffic.
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let mut session = build_session(model_path)?;

        {
            let probe = Array4::<f32>::zeros((
                1,
                3,
                CLIP_IMAGE_SIZE as usize,
                CLIP_IMAGE_SIZE as usize,
            ));
            let outputs = session.run(ort::inputs![
                "pixel_values" => Value::from_array(probe)?
            ])?;
            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;
            let shape = output_tensor.shape();

            let hidden = match shape.len() {
                3 => shape[2],
                2 => shape[1],
                _ => 0,
            };
            if hidden != CLIP_EMBED_DIM {
                anyhow::bail!(
                    "Vision model outputs unexpected dimensions: {:?} (expected {} wide)",
                    shape,
                    CLIP_EMBED_DIM
                );
            }
        }

        info!("✅ CLIP vision model loaded from {}", model_path.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dimension: CLIP_EMBED_DIM,
        })
    }

    /// Decodes and normalizes pixels into the CLIP input tensor
    fn preprocess(bytes: &[u8]) -> Result<Array4<f32>> {
        let img = image::load_from_memory(bytes).context("Failed to decode image")?;
        let resized = img.resize_exact(CLIP_IMAGE_SIZE, CLIP_IMAGE_SIZE, FilterType::CatmullRom);
        let rgb = resized.to_rgb8();

        let size = CLIP_IMAGE_SIZE as usize;
        let mut pixels = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                pixels[[0, c, y as usize, x as usize]] =
                    (pixel[c] as f32 / 255.0 - CLIP_PIXEL_MEAN[c]) / CLIP_PIXEL_STD[c];
            }
        }

        Ok(pixels)
    }
}

#[async_trait]
impl EmbeddingBackend for ClipImageModel {
    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let (bytes, _mime) = media::decode_data_uri(input)?;
        let pixels = Self::preprocess(&bytes)?;

        let mut session_guard = self.session.lock().unwrap();
        let outputs = session_guard.run(ort::inputs![
            "pixel_values" => Value::from_array(pixels)?
        ])?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let shape = output_array.shape().to_vec();

        // Patch-level states [batch, patches, hidden] get mean pooling;
        // an already-pooled [batch, hidden] output is taken as-is.
        let mut embedding = match shape.len() {
            3 => {
                let batch_0 = output_array.index_axis(Axis(0), 0);
                let flat: Vec<f32> = batch_0.iter().copied().collect();
                masked_mean_pool(&flat, shape[2], &vec![1i64; shape[1]])
            }
            2 => output_array.index_axis(Axis(0), 0).iter().copied().collect(),
            _ => anyhow::bail!("Vision model output has unexpected rank: {:?}", shape),
        };
        l2_normalize(&mut embedding);

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "clip-vit-base-patch32/vision"
    }
}

/// Loader closure for the text tower, for registry injection
pub fn clip_text_loader(model_path: PathBuf, tokenizer_path: PathBuf) -> BackendLoader {
    Arc::new(move || {
        let model_path = model_path.clone();
        let tokenizer_path = tokenizer_path.clone();
        Box::pin(async move {
            let model = ClipTextModel::new(&model_path, &tokenizer_path).await?;
            Ok(Arc::new(model) as BackendHandle)
        })
    })
}

/// Loader closure for the vision tower, for registry injection
pub fn clip_image_loader(model_path: PathBuf) -> BackendLoader {
    Arc::new(move || {
        let model_path = model_path.clone();
        Box::pin(async move {
            let model = ClipImageModel::new(&model_path).await?;
            Ok(Arc::new(model) as BackendHandle)
        })
    })
}
