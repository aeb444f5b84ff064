// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Lazy per-modality model registry
//!
//! Loading a model is expensive (disk read plus ONNX session construction,
//! potentially seconds), so each modality is initialized at most once, on
//! first use. Concurrent first-time callers coalesce onto the single
//! in-flight load instead of each starting their own. A failed load is
//! surfaced to every waiter of that attempt and resets the slot, so the next
//! request retries instead of blocking forever.
//!
//! The load itself runs on a spawned task: a caller that gives up (request
//! timeout, disconnect) does not abort the load, and a completed load still
//! populates the registry for subsequent requests.

use super::{BackendHandle, Modality};
use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{error, info};

/// Injected constructor for one modality's backend
///
/// Kept as a closure so the composition root owns the real ONNX loaders and
/// tests can substitute counting mocks.
pub type BackendLoader = Arc<dyn Fn() -> BoxFuture<'static, Result<BackendHandle>> + Send + Sync>;

/// Registry-level errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to initialize {modality} embedding model: {message}")]
    InitializationFailed { modality: Modality, message: String },
}

/// Published result of one load attempt; errors cross the channel as
/// rendered strings since waiters only report them.
type LoadOutcome = Result<BackendHandle, String>;

/// Per-modality slot lifecycle: Idle -> Loading -> Ready, back to Idle on a
/// failed load. Ready is terminal for the process lifetime.
enum SlotState {
    Idle,
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Ready(BackendHandle),
}

struct ModelSlot {
    modality: Modality,
    loader: BackendLoader,
    state: Mutex<SlotState>,
}

/// Get-or-create access to one embedding backend per modality
pub struct ModelRegistry {
    text: Arc<ModelSlot>,
    image: Arc<ModelSlot>,
}

impl ModelRegistry {
    pub fn new(text_loader: BackendLoader, image_loader: BackendLoader) -> Self {
        Self {
            text: Arc::new(ModelSlot {
                modality: Modality::Text,
                loader: text_loader,
                state: Mutex::new(SlotState::Idle),
            }),
            image: Arc::new(ModelSlot {
                modality: Modality::Image,
                loader: image_loader,
                state: Mutex::new(SlotState::Idle),
            }),
        }
    }

    fn slot(&self, modality: Modality) -> &Arc<ModelSlot> {
        match modality {
            Modality::Text => &self.text,
            Modality::Image => &self.image,
        }
    }

    /// Returns the backend for `modality`, initializing it on first use.
    ///
    /// If initialization is already in flight, waits for that attempt and
    /// shares its outcome. After a failed attempt the slot is Idle again and
    /// the next caller retries.
    pub async fn acquire(&self, modality: Modality) -> Result<BackendHandle, RegistryError> {
        let slot = self.slot(modality);

        loop {
            let mut rx = {
                let mut state = slot.state.lock().await;
                match &*state {
                    SlotState::Ready(handle) => return Ok(handle.clone()),
                    SlotState::Loading(rx) => rx.clone(),
                    SlotState::Idle => {
                        let rx = spawn_load(slot);
                        *state = SlotState::Loading(rx.clone());
                        rx
                    }
                }
            };

            loop {
                let outcome = rx.borrow().clone();
                match outcome {
                    Some(Ok(handle)) => return Ok(handle),
                    Some(Err(message)) => {
                        return Err(RegistryError::InitializationFailed { modality, message })
                    }
                    None => {
                        if rx.changed().await.is_err() {
                            // Loader task died without publishing (panic).
                            // Reset the slot, unless a newer attempt already
                            // replaced it, then start over.
                            let mut state = slot.state.lock().await;
                            if let SlotState::Loading(current) = &*state {
                                if current.same_channel(&rx) {
                                    *state = SlotState::Idle;
                                }
                            }
                            drop(state);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Whether `modality` has a fully initialized backend
    pub async fn is_ready(&self, modality: Modality) -> bool {
        matches!(*self.slot(modality).state.lock().await, SlotState::Ready(_))
    }
}

/// Runs one load attempt on its own task and publishes the outcome.
///
/// The slot state is updated before the outcome is sent, so waiters never
/// observe a published result with a stale slot.
fn spawn_load(slot: &Arc<ModelSlot>) -> watch::Receiver<Option<LoadOutcome>> {
    let (tx, rx) = watch::channel(None);
    let slot = Arc::clone(slot);
    let load = (slot.loader)();

    tokio::spawn(async move {
        info!("⏳ Loading {} embedding model...", slot.modality);
        let result = load.await;

        let mut state = slot.state.lock().await;
        match result {
            Ok(handle) => {
                info!(
                    "✅ {} embedding model ready ({} dimensions)",
                    slot.modality,
                    handle.dimension()
                );
                *state = SlotState::Ready(handle.clone());
                let _ = tx.send(Some(Ok(handle)));
            }
            Err(e) => {
                error!("❌ Failed to load {} embedding model: {:#}", slot.modality, e);
                *state = SlotState::Idle;
                let _ = tx.send(Some(Err(format!("{:#}", e))));
            }
        }
    });

    rx
}
