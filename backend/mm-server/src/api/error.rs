//! REST API error types
//!
//! Every failure becomes a JSON body `{"error": {"code", "message"}}` with
//! a matching HTTP status.

use mm_core::CoreError;
use mm_sse::SseError;

use std::panic::Location;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "RATE_LIMITED", "VALIDATION_ERROR")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400
    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    /// 429
    #[error("Rate limited: {message} {location}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
        location: ErrorLocation,
    },

    /// 503
    #[error("Unavailable: {message} {location}")]
    Unavailable {
        message: String,
        location: ErrorLocation,
    },

    /// 500
    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn validation(message: impl Into<String>, field: &str) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.to_string()),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { .. } => log::error!("{}", self),
            _ => log::warn!("{}", self),
        }

        let mut retry_after = None;
        let (status, body) = match self {
            ApiError::Validation { message, field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".into(),
                    message,
                    field,
                },
            ),
            ApiError::RateLimited {
                message,
                retry_after_secs,
                ..
            } => {
                retry_after = Some(retry_after_secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    ApiErrorBody {
                        code: "RATE_LIMITED".into(),
                        message,
                        field: None,
                    },
                )
            }
            ApiError::Unavailable { message, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "UNAVAILABLE".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Internal { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".into(),
                    message,
                    field: None,
                },
            ),
        };

        let mut response = (status, Json(ApiErrorResponse { error: body })).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<CoreError> for ApiError {
    #[track_caller]
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::RateLimitExceeded {
                key,
                limit,
                window_secs,
                ..
            } => ApiError::RateLimited {
                message: format!("Too many requests for '{key}' (limit {limit} per {window_secs}s)"),
                retry_after_secs: window_secs,
                location: ErrorLocation::from(Location::caller()),
            },
            CoreError::InvalidConfig { message, .. } => ApiError::Internal {
                message,
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}

impl From<SseError> for ApiError {
    #[track_caller]
    fn from(e: SseError) -> Self {
        match e {
            SseError::UnknownEventType { value, .. } => ApiError::Validation {
                message: format!("Unknown event type '{value}'"),
                field: Some("type".into()),
                location: ErrorLocation::from(Location::caller()),
            },
            other => ApiError::Internal {
                message: other.to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
