// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for upstream retrieval and consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Classified failure of a single upstream (Strava) call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 429 on every attempt of the retry budget.
    #[error("Strava rate limit exceeded on {endpoint} after {attempts} attempts")]
    RateLimitExceeded { endpoint: String, attempts: u32 },

    /// Non-retryable HTTP status.
    #[error("Strava API error on {endpoint}: HTTP {status}: {body}")]
    Upstream {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed payload from {endpoint}: {reason}")]
    InvalidPayload { endpoint: String, reason: String },

    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimitExceeded { .. })
    }

    /// Upstream path the failure belongs to.
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::RateLimitExceeded { endpoint, .. }
            | FetchError::Upstream { endpoint, .. }
            | FetchError::InvalidPayload { endpoint, .. }
            | FetchError::Transport { endpoint, .. } => endpoint,
        }
    }
}

/// Turns an exhausted rate-limit budget into "no data" instead of a failure.
///
/// Everything else is passed through unchanged, so callers still see
/// upstream and payload errors.
pub trait DegradeOnRateLimit<T> {
    fn or_unavailable(self) -> std::result::Result<Option<T>, FetchError>;
}

impl<T> DegradeOnRateLimit<T> for std::result::Result<Option<T>, FetchError> {
    fn or_unavailable(self) -> std::result::Result<Option<T>, FetchError> {
        match self {
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(
                    endpoint = e.endpoint(),
                    "Rate limit budget exhausted, data unavailable"
                );
                Ok(None)
            }
            other => other,
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Load derivation error: {0}")]
    Derive(#[from] crate::services::load::DeriveError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Fetch(FetchError::RateLimitExceeded { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "strava_rate_limited",
                Some(self.to_string()),
            ),
            AppError::Fetch(err) => {
                tracing::warn!(error = %err, "Strava retrieval failed");
                (StatusCode::BAD_GATEWAY, "strava_error", Some(err.to_string()))
            }
            AppError::Derive(err) => {
                tracing::error!(error = %err, "Load derivation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "derive_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
