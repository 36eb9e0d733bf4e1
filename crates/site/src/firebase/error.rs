//! Error types for the Firebase REST clients.

use thiserror::Error;

/// Errors that can occur when talking to Firebase services.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Identity Toolkit rejected the operation.
    #[error("auth error: {0}")]
    Auth(AuthApiError),

    /// A non-auth API error (database rules, bad request).
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The change stream broke.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Identity Toolkit error codes, decoded from the response message.
///
/// The REST API reports failures as an error message string (sometimes with
/// a trailing description after a colon); this enum is the typed surface the
/// rest of the crate matches on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthApiError {
    /// The email is already registered.
    #[error("an account with this email already exists")]
    EmailExists,
    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidLoginCredentials,
    /// The account has been disabled by an administrator.
    #[error("account disabled")]
    UserDisabled,
    /// No account for this identifier.
    #[error("no such account")]
    UserNotFound,
    /// Password rejected by the provider's policy.
    #[error("weak password: {0}")]
    WeakPassword(String),
    /// Throttled after repeated failures.
    #[error("too many attempts, try again later")]
    TooManyAttempts,
    /// The sign-in method is disabled for this project.
    #[error("operation not allowed")]
    OperationNotAllowed,
    /// Any other provider-reported code.
    #[error("auth provider error: {0}")]
    Other(String),
}

impl AuthApiError {
    /// Decode a provider error message into a typed code.
    ///
    /// Messages look like `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_EXISTS" => Self::EmailExists,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
                Self::InvalidLoginCredentials
            }
            "USER_DISABLED" => Self::UserDisabled,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_string()),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            other => Self::Other(other.to_string()),
        }
    }
}
