// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error body
///
/// Every error leaving the service carries an `error` field with a
/// client-safe message. Internal detail (model paths, runtime errors) stays
/// in the server log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Client-caused: missing or malformed input. Rejected before any model
    /// interaction.
    ValidationError { field: String, message: String },

    /// The embedding model failed to load; the registry will retry on the
    /// next request.
    ModelUnavailable(String),

    /// Inference failed on valid input
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::ValidationError { field, message } => ErrorResponse {
                error: message.clone(),
                field: Some(field.clone()),
            },
            ApiError::ModelUnavailable(msg) => ErrorResponse {
                error: msg.clone(),
                field: None,
            },
            ApiError::InternalError(msg) => ErrorResponse {
                error: msg.clone(),
                field: None,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
