//! Normalized API-level results.
//!
//! A non-success HTTP status is an ordinary value, not a fault: every
//! endpoint call returns [`ApiResponse::Success`] with a typed payload or
//! [`ApiResponse::ApiError`] with the status code and the server's message.

use serde::{Deserialize, Serialize};

use crate::http_client::HttpResponse;

/// Placeholder used when the server omits a message or status.
pub const UNKNOWN: &str = "unknown";

/// Status code and message of a rejected call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Extract the `message` field of a JSON error body, defaulting to `"unknown"`.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| String::from(UNKNOWN));
        Self::new(response.status, message)
    }
}

/// Outcome of a single Logs API call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiResponse<T> {
    Success(T),
    ApiError(ApiError),
}

impl<T> ApiResponse<T> {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::ApiError(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Success(_) => None,
            Self::ApiError(error) => Some(error),
        }
    }
}

/// Confirmation returned by the cancel and clean endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReceipt {
    pub status_code: u16,
    pub message: String,
}
