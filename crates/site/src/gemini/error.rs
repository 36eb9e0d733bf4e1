//! Error types for the Gemini API client.

use thiserror::Error;

/// Errors that can occur when interacting with the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code from the API.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The response carried no usable candidate content.
    #[error("model returned no content")]
    EmptyResponse,

    /// The model's output did not match the requested response schema.
    #[error("output failed schema validation: {0}")]
    SchemaValidation(String),

    /// Failed to parse the API envelope.
    #[error("parse error: {0}")]
    Parse(String),
}

/// API error response envelope from the Generative Language API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Nested error details.
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    /// Numeric status code.
    pub code: u16,
    /// Error message.
    pub message: String,
    /// Canonical status string (e.g., `INVALID_ARGUMENT`).
    pub status: String,
}
