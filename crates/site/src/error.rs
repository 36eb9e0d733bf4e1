//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::firebase::{AuthApiError, FirebaseError};
use crate::gemini::GeminiError;
use crate::recaptcha::RecaptchaError;
use crate::services::{AssistantError, ProfileError};

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Assistant flow failed.
    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// reCAPTCHA assessment failed.
    #[error("reCAPTCHA error: {0}")]
    Recaptcha(#[from] RecaptchaError),

    /// Auth or profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
///
/// Carries `success: false` so clients polling boolean-outcome endpoints
/// (the verification endpoint in particular) can read one field on both
/// the happy and the failure path.
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl AppError {
    /// Whether the failure is worth a Sentry event.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Recaptcha(e) => e.is_setup_error() || !matches!(e, RecaptchaError::Api { .. }),
            Self::Assistant(err) => !matches!(err, AssistantError::EmptyQuery),
            Self::Profile(err) => matches!(
                err,
                ProfileError::Firebase(
                    FirebaseError::Http(_)
                        | FirebaseError::Api { .. }
                        | FirebaseError::Parse(_)
                        | FirebaseError::Stream(_)
                )
            ),
            Self::BadRequest(_) | Self::Unauthorized(_) | Self::NotFound(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Assistant(err) => match err {
                AssistantError::EmptyQuery => StatusCode::BAD_REQUEST,
                AssistantError::Gemini(GeminiError::RateLimited(_)) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                AssistantError::Gemini(_) => StatusCode::BAD_GATEWAY,
                AssistantError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Recaptcha(err) => {
                if err.is_setup_error() {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            Self::Profile(err) => match err {
                ProfileError::Email(_) => StatusCode::BAD_REQUEST,
                ProfileError::NotFound => StatusCode::NOT_FOUND,
                ProfileError::Firebase(FirebaseError::Auth(auth)) => match auth {
                    AuthApiError::EmailExists => StatusCode::CONFLICT,
                    AuthApiError::InvalidLoginCredentials => StatusCode::UNAUTHORIZED,
                    AuthApiError::UserDisabled => StatusCode::FORBIDDEN,
                    AuthApiError::UserNotFound => StatusCode::NOT_FOUND,
                    AuthApiError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                    AuthApiError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                    AuthApiError::OperationNotAllowed | AuthApiError::Other(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                },
                ProfileError::Firebase(_) => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message. Internal details never leave the process.
    fn client_message(&self) -> String {
        match self {
            Self::Assistant(err) => match err {
                AssistantError::EmptyQuery => "Query must not be empty".to_string(),
                AssistantError::Gemini(GeminiError::RateLimited(_)) => {
                    "The assistant is busy, please retry shortly".to_string()
                }
                AssistantError::Gemini(_) => "The assistant is temporarily unavailable".to_string(),
                AssistantError::Template(_) => "Internal server error".to_string(),
            },
            Self::Recaptcha(err) => {
                if err.is_setup_error() {
                    // Operator-facing hint; carries no credential material.
                    "Verification is not configured for this deployment".to_string()
                } else {
                    "Verification is temporarily unavailable".to_string()
                }
            }
            Self::Profile(err) => match err {
                ProfileError::Email(_) => "Invalid email address".to_string(),
                ProfileError::NotFound => "Profile not found".to_string(),
                ProfileError::Firebase(FirebaseError::Auth(auth)) => match auth {
                    AuthApiError::WeakPassword(detail) if !detail.is_empty() => detail.clone(),
                    other => other.to_string(),
                },
                ProfileError::Firebase(_) => "Account service is temporarily unavailable".to_string(),
            },
            Self::BadRequest(msg) | Self::Unauthorized(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("profile".to_string());
        assert_eq!(err.to_string(), "Not found: profile");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_basic_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_empty_query_is_client_error() {
        assert_eq!(
            get_status(AppError::Assistant(AssistantError::EmptyQuery)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_model_failure_is_bad_gateway() {
        let err = AppError::Assistant(AssistantError::Gemini(GeminiError::EmptyResponse));
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_recaptcha_setup_failure_maps_to_500() {
        let err = AppError::Recaptcha(RecaptchaError::Api {
            status: 403,
            message: "caller does not have permission".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_recaptcha_transient_failure_maps_to_502() {
        let err = AppError::Recaptcha(RecaptchaError::Api {
            status: 500,
            message: "internal".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_auth_error_statuses() {
        let err = AppError::Profile(ProfileError::Firebase(FirebaseError::Auth(
            AuthApiError::EmailExists,
        )));
        assert_eq!(get_status(err), StatusCode::CONFLICT);

        let err = AppError::Profile(ProfileError::Firebase(FirebaseError::Auth(
            AuthApiError::InvalidLoginCredentials,
        )));
        assert_eq!(get_status(err), StatusCode::UNAUTHORIZED);

        let err = AppError::Profile(ProfileError::Firebase(FirebaseError::Auth(
            AuthApiError::TooManyAttempts,
        )));
        assert_eq!(get_status(err), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_weak_password_detail_reaches_client() {
        let err = AppError::Profile(ProfileError::Firebase(FirebaseError::Auth(
            AuthApiError::WeakPassword("Password should be at least 6 characters".to_string()),
        )));
        assert_eq!(
            err.client_message(),
            "Password should be at least 6 characters"
        );
    }

    #[test]
    fn test_error_body_carries_success_false() {
        let body = ErrorBody {
            success: false,
            error: "Missing reCAPTCHA token".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Missing reCAPTCHA token");
    }

    #[test]
    fn test_internal_detail_never_reaches_client() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
