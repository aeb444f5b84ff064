use axum::{
    extract::{DefaultBodyLimit, Request},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::errors::ErrorResponse;
use super::{embed_image, embed_text, similarity};
use crate::config::ServiceConfig;
use crate::embeddings::ModelRegistry;

/// Request body size limit (50MB, accommodates base64-encoded images)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared handler state; the registry is the only cross-request resource
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
}

/// Builds the service router with all routes and middleware
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Liveness
        .route("/", get(root_handler))
        // Image embedding: multipart upload
        .route("/vectorize-image", post(embed_image::vectorize_image_handler))
        // Text embedding (both paths share one handler and contract)
        .route("/embed", post(embed_text::embed_text_handler))
        .route("/text-embedding", post(embed_text::embed_text_handler))
        // Image embedding: JSON base64 / data-URI
        .route("/image-embedding", post(embed_image::image_embedding_handler))
        // Cosine similarity helper
        .route("/similarity", post(similarity::similarity_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        // Must sit outside the timeout and body-limit layers to catch
        // their rejections
        .layer(middleware::from_fn(json_error_body))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "🧠 CLIP embedding node is running"
}

/// Rewraps middleware- and extractor-generated rejections (request timeout,
/// body-size limit, malformed JSON) into the `{error}` JSON body. Handler
/// errors already arrive as JSON and pass through untouched.
async fn json_error_body(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);
    if is_json {
        return response;
    }

    // Rejection bodies are short plain-text diagnostics; an empty body
    // (e.g. the timeout layer's 408) falls back to the status reason
    let message = match axum::body::to_bytes(response.into_body(), 4096).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            field: None,
        }),
    )
        .into_response()
}

/// Binds the listener and serves until ctrl-c
pub async fn start_server(
    config: &ServiceConfig,
    registry: Arc<ModelRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState { registry };
    let app = build_router(state, Duration::from_secs(config.request_timeout_secs));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🚀 Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
