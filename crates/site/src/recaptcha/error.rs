//! Error types for the reCAPTCHA Enterprise client.

use thiserror::Error;

use crate::google::TokenError;

/// Errors that can occur when creating an assessment.
#[derive(Debug, Error)]
pub enum RecaptchaError {
    /// Access-token acquisition failed.
    #[error("credential error: {0}")]
    Token(#[from] TokenError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Assessment API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Failed to parse the assessment response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RecaptchaError {
    /// Whether this failure is a deployment setup problem (credentials,
    /// project configuration) rather than a transient fault.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        match self {
            Self::Token(e) => e.is_setup_error(),
            Self::Api { status, .. } => matches!(status, 401 | 403),
            Self::Http(_) | Self::Parse(_) => false,
        }
    }
}
