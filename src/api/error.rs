use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub(crate) const ABSOLUTE_BASE_HINT: &str = "Check the API server is running and reachable.";
pub(crate) const RELATIVE_BASE_HINT: &str =
    "Ensure the dev server proxy target is correct (KATALOG_API_PROXY_TARGET).";

/// Errors returned by [`ApiClient`](super::ApiClient). The `Display` output is
/// meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {}s. Is the API server running?", .0.as_secs())]
    Timeout(Duration),
    #[error("API request failed: {message}. {hint}")]
    Network { message: String, hint: &'static str },
    #[error("Not found")]
    NotFound,
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Invalid response from API: {0}")]
    Decode(String),
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Build the error for a non-success response. The body text is the
    /// message; an empty body falls back to the status code.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound;
        }
        let message = if body.trim().is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            body
        };
        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }
}
